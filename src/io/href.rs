//! HREF helpers: read modifiers, GDAL paths, existence checks and
//! absolute/relative conversion for local paths and URLs.
use std::path::{Component, Path, PathBuf};

use reqwest::blocking::Client;
use tracing::debug;

use crate::error::Result;

/// Caller-supplied function rewriting an HREF before it is read,
/// e.g. to append an access token to a URL.
pub type ReadHrefModifier = dyn Fn(&str) -> String;

pub fn modify_href(href: &str, modifier: Option<&ReadHrefModifier>) -> String {
    match modifier {
        Some(modify) => modify(href),
        None => href.to_string(),
    }
}

pub fn is_remote(href: &str) -> bool {
    href.starts_with("http://") || href.starts_with("https://")
}

fn strip_file_scheme(href: &str) -> &str {
    href.strip_prefix("file://").unwrap_or(href)
}

/// Path GDAL can open: remote URLs go through `/vsicurl/`
pub fn gdal_path(href: &str) -> String {
    if is_remote(href) {
        format!("/vsicurl/{}", href)
    } else {
        strip_file_scheme(href).to_string()
    }
}

/// Replace the final path component of an HREF
pub fn sibling_href(href: &str, file_name: &str) -> String {
    match href.rfind(['/', '\\']) {
        Some(idx) => format!("{}{}", &href[..=idx], file_name),
        None => file_name.to_string(),
    }
}

/// Whether a local file or remote object exists. Remote objects are probed with `HEAD`
/// through `client`.
pub fn href_exists(client: &Client, href: &str) -> Result<bool> {
    if is_remote(href) {
        let response = client.head(href).send()?;
        debug!("HEAD {} -> {}", href, response.status());
        Ok(response.status().is_success())
    } else {
        Ok(Path::new(strip_file_scheme(href)).exists())
    }
}

/// Read a text document from a local path or URL
pub fn read_text(href: &str) -> Result<String> {
    if is_remote(href) {
        let response = reqwest::blocking::get(href)?.error_for_status()?;
        Ok(response.text()?)
    } else {
        Ok(std::fs::read_to_string(strip_file_scheme(href))?)
    }
}

/// Absolute form of a local path; URLs are returned unchanged
pub fn make_absolute_href(href: &str) -> String {
    if is_remote(href) {
        return href.to_string();
    }
    let path = Path::new(strip_file_scheme(href));
    match std::path::absolute(path) {
        Ok(abs) => normalize(&abs).to_string_lossy().into_owned(),
        Err(_) => href.to_string(),
    }
}

/// Express a local HREF relative to `start_dir`; URLs are returned unchanged
pub fn make_relative_href(href: &str, start_dir: &Path) -> String {
    if is_remote(href) {
        return href.to_string();
    }
    let target = PathBuf::from(make_absolute_href(href));
    let start = match std::path::absolute(start_dir) {
        Ok(abs) => normalize(&abs),
        Err(_) => return href.to_string(),
    };
    relative_path(&target, &start)
        .map(|p| {
            let s = p.to_string_lossy().replace('\\', "/");
            if s.starts_with("../") { s } else { format!("./{}", s) }
        })
        .unwrap_or_else(|| href.to_string())
}

// Lexically resolve `.` and `..` components
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other.as_os_str()),
        }
    }
    out
}

// Both paths must be absolute and normalized; None when they share no root (e.g. other drive)
fn relative_path(target: &Path, start: &Path) -> Option<PathBuf> {
    let target: Vec<Component> = target.components().collect();
    let start: Vec<Component> = start.components().collect();
    if target.first() != start.first() {
        return None;
    }
    let common = target
        .iter()
        .zip(start.iter())
        .take_while(|(a, b)| a == b)
        .count();
    let mut rel = PathBuf::new();
    for _ in common..start.len() {
        rel.push("..");
    }
    for component in &target[common..] {
        rel.push(component.as_os_str());
    }
    Some(rel)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn remote_hrefs_go_through_vsicurl() {
        assert_eq!(
            gdal_path("https://example.com/a/HLS.tif"),
            "/vsicurl/https://example.com/a/HLS.tif"
        );
        assert_eq!(gdal_path("file:///data/HLS.tif"), "/data/HLS.tif");
        assert_eq!(gdal_path("/data/HLS.tif"), "/data/HLS.tif");
    }

    #[test]
    fn modifier_is_applied() {
        let add_token = |href: &str| format!("{}?token=abc", href);
        assert_eq!(
            modify_href("https://x/y.tif", Some(&add_token)),
            "https://x/y.tif?token=abc"
        );
        assert_eq!(modify_href("https://x/y.tif", None), "https://x/y.tif");
    }

    #[test]
    fn sibling_replaces_file_name() {
        assert_eq!(
            sibling_href("https://x/l30/HLS.a.B01.tif", "HLS.a.cmr.xml"),
            "https://x/l30/HLS.a.cmr.xml"
        );
        assert_eq!(sibling_href("HLS.a.B01.tif", "HLS.a.B02.tif"), "HLS.a.B02.tif");
    }

    #[test]
    fn relative_hrefs() {
        assert_eq!(
            make_relative_href("/data/hls/HLS.a.B01.tif", Path::new("/data/hls")),
            "./HLS.a.B01.tif"
        );
        assert_eq!(
            make_relative_href("/data/hls/HLS.a.B01.tif", Path::new("/data/stac/items")),
            "../../hls/HLS.a.B01.tif"
        );
        assert_eq!(
            make_relative_href("https://x/HLS.a.B01.tif", Path::new("/data")),
            "https://x/HLS.a.B01.tif"
        );
    }

    #[test]
    fn local_existence_uses_the_filesystem() {
        let dir = tempfile::tempdir().unwrap();
        let present = dir.path().join("HLS.a.B01.tif");
        std::fs::write(&present, b"").unwrap();
        let client = Client::new();
        for _ in 0..2 {
            assert!(href_exists(&client, &present.to_string_lossy()).unwrap());
        }
        let missing = dir.path().join("HLS.a.B02.tif");
        assert!(!href_exists(&client, &missing.to_string_lossy()).unwrap());
    }

    #[test]
    fn absolute_href_resolves_dots() {
        assert_eq!(make_absolute_href("/data/./hls/../HLS.tif"), "/data/HLS.tif");
    }
}
