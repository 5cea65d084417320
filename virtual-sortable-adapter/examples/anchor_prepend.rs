// Example: load older rows above the viewport without the content jumping.
use virtual_sortable::{Edge, Rect};
use virtual_sortable_adapter::{ListOptions, VirtualList};

#[derive(Clone, Debug)]
struct Message {
    id: u64,
    text: String,
}

fn page(ids: std::ops::Range<u64>) -> Vec<Message> {
    ids.map(|id| Message {
        id,
        text: format!("message #{id}"),
    })
    .collect()
}

fn main() -> Result<(), virtual_sortable::Error> {
    // The adapter flow is:
    // 1) a `Top` edge signal captures the first visible row (with `keep_offset`)
    // 2) the app loads older rows and calls `set_items`
    // 3) the list scrolls so the captured row stays where it was
    let mut history = page(1000..1100);
    let mut list = VirtualList::new(
        history.clone(),
        |m: &Message| m.id,
        ListOptions {
            keep_offset: true,
            ..ListOptions::default()
        },
    )?;
    list.update_virtual_options(|o| o.estimated_size = 24)?;
    list.on_resize(Rect {
        main: 240,
        cross: 320,
    });

    if list.on_scroll(0, 0) == Some(Edge::Top) {
        let mut older = page(900..1000);
        older.append(&mut history);
        history = older;
        let restored = list.set_items(history.clone())?;
        println!("restored offset={restored:?}");
    }

    let first = list.rendered().first().map(|m| m.text.as_str());
    println!("range={:?} first rendered={first:?}", list.range());
    Ok(())
}
