use core::cmp::Ordering;

/// ASCII case-folded lexicographic comparison. Bytes are folded to lower
/// case one at a time; the first differing folded byte or an exhausted side
/// decides.
pub fn ascii_casecmp(a: &str, b: &str) -> Ordering {
    let fold = |byte: u8| byte.to_ascii_lowercase();
    a.bytes().map(fold).cmp(b.bytes().map(fold))
}

/// In-place quicksort over file names, ordered by [`ascii_casecmp`]. Not
/// stable. Worst case is quadratic on already-ordered input, which stays
/// acceptable while listings are capped.
pub fn sort_names<T: AsRef<str>>(names: &mut [T]) {
    if names.len() > 1 {
        quick_sort(names, 0, names.len() - 1);
    }
}

fn quick_sort<T: AsRef<str>>(items: &mut [T], low: usize, high: usize) {
    if low < high {
        let pivot = partition(items, low, high);
        if pivot > low {
            quick_sort(items, low, pivot - 1);
        }
        if pivot < high {
            quick_sort(items, pivot + 1, high);
        }
    }
}

// Last element of the range is the pivot.
fn partition<T: AsRef<str>>(items: &mut [T], low: usize, high: usize) -> usize {
    let mut store = low;
    for probe in low..high {
        if ascii_casecmp(items[probe].as_ref(), items[high].as_ref()) == Ordering::Less {
            items.swap(store, probe);
            store += 1;
        }
    }
    items.swap(store, high);
    store
}
