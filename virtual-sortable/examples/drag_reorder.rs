// Example: reorder a list by dragging one item down.
use virtual_sortable::{Point, Rect, Sortable, SortableOptions, Virtual, VirtualOptions};

fn main() -> Result<(), virtual_sortable::Error> {
    let items = vec!["a", "b", "c", "d", "e", "f"];
    let mut v = Virtual::new(
        VirtualOptions::new(items.clone())
            .with_estimated_size(10)
            .with_initial_rect(Some(Rect {
                main: 60,
                cross: 200,
            })),
    )?;
    let mut s = Sortable::new(SortableOptions::new(items.clone(), items).with_on_drop(Some(
        |e: &virtual_sortable::DropEvent<&str, &str>| {
            println!("  on_drop: {} {:?} -> {:?}", e.item, e.old_index, e.new_index);
        },
    )))?;

    let started = s.on_drag_start(&mut v, 2);
    println!("drag start: {started:?}");
    println!("dragged key excluded: {:?}", v.excluded_key());

    // The pointer moves over the last row.
    let target = s.on_drag_move(&v, Point::new(100, 55));
    println!("target={target:?}");

    if let Some(dropped) = s.on_drop(&mut v) {
        println!("changed={} list={:?}", dropped.changed, dropped.list);
    }
    Ok(())
}
