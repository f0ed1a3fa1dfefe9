/*!
 * Walkthrough Scenario
 * A full session on the default 1024-unit address space
 */

use memsim::memory::{Block, MemoryError, MemoryManager, SwapEntry};
use memsim::ProcessName;
use pretty_assertions::assert_eq;

fn occupied(name: &str, size: usize) -> Block {
    Block::occupied(ProcessName::new(name).unwrap(), size)
}

#[test]
fn test_allocate_free_compact_swap_walkthrough() {
    let mem_mgr = MemoryManager::new();

    let outcome = mem_mgr.allocate("A", 300).unwrap();
    assert_eq!(
        outcome.snapshot().blocks,
        vec![occupied("A", 300), Block::free(724)]
    );

    let outcome = mem_mgr.allocate("B", 200).unwrap();
    assert_eq!(
        outcome.snapshot().blocks,
        vec![occupied("A", 300), occupied("B", 200), Block::free(524)]
    );

    // The hole left by A is not adjacent to the trailing free block
    let outcome = mem_mgr.free("A").unwrap();
    assert_eq!(
        outcome.snapshot().blocks,
        vec![Block::free(300), occupied("B", 200), Block::free(524)]
    );

    let before = mem_mgr.layout();
    match mem_mgr.allocate("C", 1000) {
        Err(MemoryError::OutOfMemory {
            requested,
            largest_free,
            total_free,
        }) => {
            assert_eq!(requested, 1000);
            assert_eq!(largest_free, 524);
            assert_eq!(total_free, 824);
        }
        other => panic!("Expected OutOfMemory error, got {:?}", other),
    }
    assert_eq!(mem_mgr.layout(), before);

    let outcome = mem_mgr.compact();
    assert!(outcome.changed());
    assert_eq!(
        outcome.snapshot().blocks,
        vec![occupied("B", 200), Block::free(824)]
    );

    // Compaction merges free space but cannot create more of it
    let err = mem_mgr.allocate("C", 1000).unwrap_err();
    assert!(!err.is_fragmentation());

    let outcome = mem_mgr.swap_out("B").unwrap();
    assert_eq!(outcome.snapshot().blocks, vec![Block::free(1024)]);
    assert_eq!(
        mem_mgr.swap_entries(),
        vec![SwapEntry {
            name: ProcessName::new("B").unwrap(),
            size: 200,
        }]
    );
}

#[test]
fn test_walkthrough_placements() {
    let mem_mgr = MemoryManager::new();
    mem_mgr.allocate("A", 300).unwrap();
    mem_mgr.allocate("B", 200).unwrap();
    mem_mgr.free("A").unwrap();

    let placed = mem_mgr.snapshot().placed();
    let offsets: Vec<usize> = placed.iter().map(|p| p.offset).collect();
    assert_eq!(offsets, vec![0, 300, 500]);

    // A smaller request reuses the leftmost hole
    mem_mgr.allocate("D", 100).unwrap();
    assert_eq!(
        mem_mgr.snapshot().blocks,
        vec![
            occupied("D", 100),
            Block::free(200),
            occupied("B", 200),
            Block::free(524),
        ]
    );
}
