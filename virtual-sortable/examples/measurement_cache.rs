// Example: export and import measured sizes.
use virtual_sortable::{Virtual, VirtualOptions};

fn main() -> Result<(), virtual_sortable::Error> {
    // Persisting measurements across screens/sessions lets a list start with real sizes instead
    // of re-measuring everything.
    let keys: Vec<u32> = (0..10).collect();
    let mut v1 = Virtual::new(VirtualOptions::new(keys.clone()).with_estimated_size(1))?;
    v1.report_size(2, 10);
    v1.report_size(5, 42);

    let snapshot = v1.export_sizes();
    println!("exported_cache_len={}", snapshot.len());

    let mut v2 = Virtual::new(VirtualOptions::new(keys).with_estimated_size(1))?;
    println!(
        "before import: size2={:?} size5={:?}",
        v2.size_of_key(&2),
        v2.size_of_key(&5)
    );

    v2.import_sizes(snapshot);
    println!(
        "after import: cache_len={} size2={:?} size5={:?} scroll_size={}",
        v2.measurement_cache_len(),
        v2.size_of_key(&2),
        v2.size_of_key(&5),
        v2.scroll_size()
    );
    Ok(())
}
