// Example: minimal windowing over a million rows.
use virtual_sortable::{Align, Rect, Virtual, VirtualOptions};

fn main() -> Result<(), virtual_sortable::Error> {
    let keys: Vec<u64> = (0..1_000_000).collect();
    let mut v = Virtual::new(
        VirtualOptions::new(keys)
            .with_keeps(30)
            .with_estimated_size(20)
            .with_initial_rect(Some(Rect {
                main: 400,
                cross: 300,
            })),
    )?;

    v.on_scroll(123_456);
    let r = v.range();
    println!("scroll_size={}", v.scroll_size());
    println!("range={}..={} front={} behind={}", r.start, r.end, r.front, r.behind);

    let off = v.scroll_to_index(500_000, Align::Top);
    println!("after scroll_to_index: offset={off} range={:?}", v.range());
    Ok(())
}
