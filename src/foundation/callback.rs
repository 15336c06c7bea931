use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

/// One-shot completion callback.
pub type Callback = Box<dyn FnOnce()>;

/// Splits `callback` into `count` callbacks; `callback` runs once all of them have run.
///
/// With `count == 0` the callback runs immediately and nothing is returned.
pub fn after(count: usize, callback: Callback) -> Vec<Callback> {
    if count == 0 {
        callback();
        return Vec::new();
    }

    let remaining = Rc::new(Cell::new(count));
    let pending = Rc::new(RefCell::new(Some(callback)));
    (0..count)
        .map(|_| {
            let remaining = Rc::clone(&remaining);
            let pending = Rc::clone(&pending);
            Box::new(move || {
                let left = remaining.get().saturating_sub(1);
                remaining.set(left);
                if left == 0 {
                    let cb = pending.borrow_mut().take();
                    if let Some(cb) = cb {
                        cb();
                    }
                }
            }) as Callback
        })
        .collect()
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/callback.rs"]
mod tests;
