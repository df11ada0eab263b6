//! Basic usage example for rescache
//!
//! Run with: RUST_LOG=debug cargo run --example basic_usage

use rescache::{ChangeKind, FileBacked, FileRegistry, FileResource, ResourceCache};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// A "decoded" image: here just the file bytes
type Image = FileResource<Vec<u8>>;

fn load(registry: &FileRegistry<Image>, path: &Path) -> rescache::Result<Arc<Image>> {
    let bytes = fs::read(path).unwrap_or_default();
    registry.track(path)?;
    Ok(Arc::new(Image::new(path, bytes)))
}

fn main() -> rescache::Result<()> {
    env_logger::init();

    let dir = std::env::temp_dir().join("rescache-demo");
    fs::create_dir_all(&dir).ok();

    let paths: Vec<PathBuf> = ["cat.png", "dog.png", "owl.png"]
        .iter()
        .map(|name| dir.join(name))
        .collect();
    for (i, path) in paths.iter().enumerate() {
        fs::write(path, vec![0u8; 40 + i * 10]).ok();
    }

    // =========================================================================
    // 1. Build a cache with a 100 byte budget
    // =========================================================================
    let registry = Arc::new(FileRegistry::<Image>::new());
    let cache = ResourceCache::<Image>::builder()
        .label("images")
        .max_size(100)
        .registry(registry.clone())
        .release(|image: &Arc<Image>| println!("   released {}", image.path().display()))
        .build()?;

    println!("1. Caching three images (40 + 50 + 60 bytes)");
    for path in &paths {
        let image = load(&registry, path)?;
        cache.put(image.clone(), image.data().len() as u64)?;
    }
    println!("   {}", cache.dump());

    // =========================================================================
    // 2. Lookups promote entries
    // =========================================================================
    println!("\n2. Looking up {}", paths[2].display());
    match cache.lookup(&paths[2])? {
        Some(image) => println!("   hit, {} bytes", image.data().len()),
        None => println!("   miss"),
    }

    // =========================================================================
    // 3. A changed file is dropped on the next scan
    // =========================================================================
    println!("\n3. Rewriting {}", paths[2].display());
    fs::write(&paths[2], b"new content").ok();
    let changed = registry.check_changed();
    println!("   {} file(s) changed", changed.len());

    // =========================================================================
    // 4. Explicit notifications
    // =========================================================================
    let image = load(&registry, &paths[0])?;
    cache.put(image.clone(), image.data().len() as u64)?;
    println!("\n4. Renames do not touch content");
    registry.notify(paths[0].clone(), ChangeKind::Renamed);
    println!("   still cached: {}", cache.contains(&paths[0]));

    // =========================================================================
    // 5. Shrinking the budget
    // =========================================================================
    println!("\n5. Shrinking the budget to 10 bytes");
    cache.set_max_size(10)?;
    println!("   {}", cache.dump());

    let stats = cache.stats();
    println!(
        "\nHits: {}, misses: {}, evictions: {}, invalidations: {}",
        stats.hits, stats.misses, stats.evictions, stats.invalidations
    );

    drop(cache);
    fs::remove_dir_all(&dir).ok();
    Ok(())
}
