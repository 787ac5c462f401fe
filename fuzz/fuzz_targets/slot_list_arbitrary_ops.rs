#![no_main]

use cachet::ds::SlotList;
use libfuzzer_sys::fuzz_target;

// Fuzz arbitrary operation sequences on SlotList
//
// Random sequences of push_front, remove, move_to_front, pop_back, and
// clear, validating the link structure after every step.
fuzz_target!(|data: &[u8]| {
    let mut list: SlotList<u32> = SlotList::new();
    let mut ids = Vec::new();

    let mut idx = 0;
    while idx + 1 < data.len() {
        let op = data[idx] % 6;
        let value = u32::from(data[idx + 1]);

        match op {
            0 => {
                let id = list.push_front(value);
                assert_eq!(list.front(), Some(&value));
                assert!(list.contains(id));
                ids.push(id);
            }
            1 => {
                if !ids.is_empty() {
                    let id = ids.swap_remove((value as usize) % ids.len());
                    let old_len = list.len();
                    if list.remove(id).is_some() {
                        assert_eq!(list.len(), old_len - 1);
                        assert!(!list.contains(id));
                    }
                }
            }
            2 => {
                if !ids.is_empty() {
                    let id = ids[(value as usize) % ids.len()];
                    if list.move_to_front(id) {
                        assert_eq!(list.front(), list.get(id));
                    }
                }
            }
            3 => {
                let old_len = list.len();
                if list.pop_back().is_some() {
                    assert_eq!(list.len(), old_len - 1);
                }
            }
            4 => {
                // Forward and backward traversals must agree on content.
                let forward: Vec<u32> = list.iter().copied().collect();
                let mut backward: Vec<u32> = list.iter_from_back().copied().collect();
                backward.reverse();
                assert_eq!(forward, backward);
            }
            _ => {
                if value % 16 == 0 {
                    list.clear();
                    ids.clear();
                    assert!(list.is_empty());
                }
            }
        }

        list.debug_validate_invariants();
        idx += 2;
    }
});
