use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::io::href::make_relative_href;
use crate::stac::{Collection, Item, Link};

const COLLECTION_FILE: &str = "collection.json";
const STRUCTURAL_RELS: &[&str] = &["self", "root", "parent", "collection", "item"];

fn write_json<T: Serialize>(value: &T, path: &Path) -> Result<()> {
    let json_string = serde_json::to_string_pretty(value)?;
    std::fs::write(path, json_string)?;
    Ok(())
}

fn retain_non_structural(links: &mut Vec<Link>) {
    links.retain(|l| !STRUCTURAL_RELS.contains(&l.rel.as_str()));
}

/// Write `<dir>/<id>.json`. Local asset HREFs are made relative to `dir`.
pub fn write_item(item: &Item, dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let mut item = item.clone();
    for asset in item.assets.values_mut() {
        asset.href = make_relative_href(&asset.href, dir);
    }
    let path = dir.join(format!("{}.json", item.id));
    write_json(&item, &path)?;
    info!("Wrote item: {:?}", path);
    Ok(path)
}

/// Write a self-contained collection: `<dir>/collection.json` plus
/// `<dir>/<id>/<id>.json` per item, linked with relative HREFs.
pub fn write_collection(collection: &Collection, items: &[Item], dir: &Path) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let mut collection = collection.clone();
    retain_non_structural(&mut collection.links);
    collection
        .links
        .push(Link::json("root", format!("./{}", COLLECTION_FILE)).with_title(
            collection.title.as_deref().unwrap_or(collection.id.as_str()),
        ));

    for item in items {
        let mut item = item.clone();
        retain_non_structural(&mut item.links);
        let up = format!("../{}", COLLECTION_FILE);
        item.links.push(Link::json("root", up.as_str()));
        item.links.push(Link::json("parent", up.as_str()));
        item.links.push(Link::json("collection", up));
        item.collection = Some(collection.id.clone());
        write_item(&item, &dir.join(&item.id))?;

        collection
            .links
            .push(Link::json("item", format!("./{0}/{0}.json", item.id)));
    }

    let path = dir.join(COLLECTION_FILE);
    write_json(&collection, &path)?;
    info!("Wrote collection with {} items: {:?}", items.len(), path);
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stac::Asset;
    use serde_json::{Map, Value};

    fn item_with_asset(id: &str, href: &str) -> Item {
        let mut item = Item::new(id);
        item.assets.insert(
            "blue".into(),
            Asset {
                href: href.into(),
                type_: None,
                title: None,
                description: None,
                roles: vec!["data".into()],
                extra_fields: Map::new(),
            },
        );
        item
    }

    fn read(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn item_assets_become_relative() {
        let dir = tempfile::tempdir().unwrap();
        let cog = dir.path().join("cogs").join("HLS.a.B02.tif");
        let item = item_with_asset("HLS.a", &cog.to_string_lossy());
        let out = write_item(&item, &dir.path().join("stac")).unwrap();
        assert!(out.ends_with("stac/HLS.a.json"));
        let json = read(&out);
        assert_eq!(json["assets"]["blue"]["href"], "../cogs/HLS.a.B02.tif");
    }

    #[test]
    fn remote_assets_are_untouched() {
        let dir = tempfile::tempdir().unwrap();
        let item = item_with_asset("HLS.b", "https://example.com/HLS.b.B02.tif");
        let json = read(&write_item(&item, dir.path()).unwrap());
        assert_eq!(json["assets"]["blue"]["href"], "https://example.com/HLS.b.B02.tif");
    }

    #[test]
    fn collection_links_items() {
        let dir = tempfile::tempdir().unwrap();
        let collection = crate::api::create_collection().unwrap();
        let items = vec![
            item_with_asset("HLS.x", "https://example.com/x.tif"),
            item_with_asset("HLS.y", "https://example.com/y.tif"),
        ];
        let path = write_collection(&collection, &items, dir.path()).unwrap();

        let json = read(&path);
        let item_links: Vec<&str> = json["links"]
            .as_array()
            .unwrap()
            .iter()
            .filter(|l| l["rel"] == "item")
            .map(|l| l["href"].as_str().unwrap())
            .collect();
        assert_eq!(item_links, vec!["./HLS.x/HLS.x.json", "./HLS.y/HLS.y.json"]);

        let item = read(&dir.path().join("HLS.x").join("HLS.x.json"));
        assert_eq!(item["collection"], "hls");
        assert!(
            item["links"]
                .as_array()
                .unwrap()
                .iter()
                .any(|l| l["rel"] == "parent" && l["href"] == "../collection.json")
        );
    }
}
