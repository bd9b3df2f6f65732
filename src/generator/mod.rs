//! Artifact generators (sitemap).

pub mod sitemap;
