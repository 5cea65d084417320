// Example: sizes discovered after render.
use virtual_sortable::{Rect, Virtual, VirtualOptions};

fn main() -> Result<(), virtual_sortable::Error> {
    let keys: Vec<&str> = vec!["intro", "chart", "table", "notes", "footer", "appendix"];
    let mut v = Virtual::new(
        VirtualOptions::new(keys)
            .with_keeps(4)
            .with_estimated_size(50)
            .with_initial_rect(Some(Rect {
                main: 120,
                cross: 0,
            }))
            .with_on_update(Some(|u: virtual_sortable::RangeUpdate| {
                println!("  update: {:?} changed={} cause={:?}", u.range, u.changed, u.cause);
            })),
    )?;
    println!("before: scroll_size={} range={:?}", v.scroll_size(), v.range());

    // The presentation layer reports each rendered item once it has been laid out.
    for (key, size) in [("intro", 30), ("chart", 240), ("table", 90), ("notes", 40)] {
        v.report_size(key, size);
    }
    // Unmeasured rows now use the running average instead of the initial estimate.
    println!(
        "after: average={} scroll_size={} offset_of(4)={}",
        v.average_size(),
        v.scroll_size(),
        v.offset_of(4)
    );

    // Late reports for rows that are gone are ignored.
    v.set_keys(vec!["intro", "chart", "table"]);
    println!(
        "ignored stale report: {}",
        !v.report_size("footer", 10)
    );
    Ok(())
}
