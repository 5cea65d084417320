// Example: drag a card from one column into another.
use virtual_sortable::{Point, Rect};
use virtual_sortable_adapter::{ListOptions, VirtualList};

type Column = VirtualList<&'static str, &'static str>;

fn column(cards: &[&'static str]) -> Result<Column, virtual_sortable::Error> {
    let mut list = VirtualList::new(cards.to_vec(), |c: &&'static str| *c, ListOptions::default())?;
    list.update_virtual_options(|o| o.estimated_size = 40)?;
    list.on_resize(Rect {
        main: 400,
        cross: 200,
    });
    Ok(list)
}

fn main() -> Result<(), virtual_sortable::Error> {
    let mut todo = column(&["write docs", "fix login", "review PR"])?;
    let mut done = column(&["ship 0.1"])?;

    let Some(started) = todo.drag_start(1) else {
        return Ok(());
    };
    // The pointer leaves the first column (to its right)...
    println!("todo target={:?}", todo.drag_move(Point::new(250, 50)));
    // ...and enters the second one, below its only card.
    done.drag_enter(started.item);
    println!("done target={:?}", done.drag_move(Point::new(20, 30)));

    todo.commit_drop();
    done.commit_drop();
    println!("todo={:?}", todo.items());
    println!("done={:?}", done.items());
    Ok(())
}
