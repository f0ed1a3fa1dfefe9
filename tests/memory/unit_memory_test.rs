/*!
 * Memory Manager Tests
 * Allocation, release, compaction, swapping and OOM handling through a session
 */

use memsim::memory::{
    Block, ErrorKind, InvalidInput, MemoryError, MemoryInfo, MemoryManager, MemoryPressure,
    MemorySimulator, Outcome, SwapEntry, Swapper,
};
use memsim::{MemoryConfig, ProcessName};
use pretty_assertions::assert_eq;

fn occupied(name: &str, size: usize) -> Block {
    Block::occupied(ProcessName::new(name).unwrap(), size)
}

#[test]
fn test_memory_manager_initialization() {
    let mem_mgr = MemoryManager::new();
    let (total, used, available) = mem_mgr.info();

    assert_eq!(total, 1024);
    assert_eq!(used, 0);
    assert_eq!(available, total);
    assert_eq!(mem_mgr.snapshot().blocks, vec![Block::free(1024)]);
    assert!(mem_mgr.swap_entries().is_empty());
}

#[test]
fn test_custom_capacity() {
    let mem_mgr = MemoryManager::with_capacity(256).unwrap();
    assert_eq!(mem_mgr.info(), (256, 0, 256));

    assert_eq!(
        MemoryManager::with_capacity(0).unwrap_err(),
        MemoryError::InvalidInput(InvalidInput::ZeroCapacity)
    );
}

#[test]
fn test_independent_sessions() {
    let first = MemoryManager::with_capacity(100).unwrap();
    let second = MemoryManager::with_capacity(200).unwrap();

    first.allocate("A", 50).unwrap();

    assert_eq!(first.info(), (100, 50, 50));
    assert_eq!(second.info(), (200, 0, 200));
}

#[test]
fn test_basic_allocation() {
    let mem_mgr = MemoryManager::new();

    let outcome = mem_mgr.allocate("A", 300).unwrap();
    match &outcome {
        Outcome::Allocated { name, size, .. } => {
            assert_eq!(name, "A");
            assert_eq!(*size, 300);
        }
        other => panic!("Expected Allocated outcome, got {:?}", other),
    }
    assert_eq!(
        outcome.snapshot().blocks,
        vec![occupied("A", 300), Block::free(724)]
    );

    let (_, used, _) = mem_mgr.info();
    assert_eq!(used, 300);
}

#[test]
fn test_multiple_allocations_are_adjacent() {
    let mem_mgr = MemoryManager::new();

    mem_mgr.allocate("A", 100).unwrap();
    mem_mgr.allocate("B", 200).unwrap();
    mem_mgr.allocate("C", 300).unwrap();

    let layout = mem_mgr.layout();
    assert_eq!(layout.offset_of("A"), Some(0));
    assert_eq!(layout.offset_of("B"), Some(100));
    assert_eq!(layout.offset_of("C"), Some(300));

    let (_, used, _) = mem_mgr.info();
    assert_eq!(used, 600);
}

#[test]
fn test_allocation_and_free() {
    let mem_mgr = MemoryManager::new();

    mem_mgr.allocate("A", 512).unwrap();
    let (_, used_before, _) = mem_mgr.info();
    assert_eq!(used_before, 512);

    let outcome = mem_mgr.free("A").unwrap();
    assert!(matches!(outcome, Outcome::Freed { size: 512, .. }));
    let (_, used_after, _) = mem_mgr.info();
    assert_eq!(used_after, 0);
    assert_eq!(mem_mgr.snapshot().blocks, vec![Block::free(1024)]);
}

#[test]
fn test_out_of_memory() {
    let mem_mgr = MemoryManager::new();

    let result = mem_mgr.allocate("huge", 2048);
    match result {
        Err(MemoryError::OutOfMemory {
            requested,
            largest_free,
            total_free,
        }) => {
            assert_eq!(requested, 2048);
            assert_eq!(largest_free, 1024);
            assert_eq!(total_free, 1024);
        }
        other => panic!("Expected OutOfMemory error, got {:?}", other),
    }
    assert_eq!(mem_mgr.snapshot().blocks, vec![Block::free(1024)]);
}

#[test]
fn test_oom_from_fragmentation() {
    let mem_mgr = MemoryManager::new();
    mem_mgr.allocate("A", 400).unwrap();
    mem_mgr.allocate("B", 224).unwrap();
    mem_mgr.allocate("C", 400).unwrap();
    mem_mgr.free("A").unwrap();
    mem_mgr.free("C").unwrap();

    // 800 units free in total, but split into two holes of 400
    let err = mem_mgr.allocate("D", 500).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::OutOfMemory);
    assert!(err.is_fragmentation());

    // Compaction merges the holes, after which the request fits
    assert!(mem_mgr.compact().changed());
    mem_mgr.allocate("D", 500).unwrap();
    assert_eq!(
        mem_mgr.snapshot().blocks,
        vec![occupied("B", 224), occupied("D", 500), Block::free(300)]
    );
}

#[test]
fn test_invalid_inputs_leave_layout_untouched() {
    let mem_mgr = MemoryManager::new();
    mem_mgr.allocate("A", 100).unwrap();
    let before = mem_mgr.layout();

    assert_eq!(
        mem_mgr.allocate("", 10).unwrap_err(),
        MemoryError::InvalidInput(InvalidInput::EmptyName)
    );
    assert_eq!(
        mem_mgr.allocate("B", 0).unwrap_err(),
        MemoryError::InvalidInput(InvalidInput::NonPositiveSize(0))
    );
    assert_eq!(
        mem_mgr.allocate("A", 10).unwrap_err(),
        MemoryError::InvalidInput(InvalidInput::DuplicateName("A".into()))
    );

    assert_eq!(mem_mgr.layout(), before);
}

#[test]
fn test_invalid_free() {
    let mem_mgr = MemoryManager::new();

    let result = mem_mgr.free("ghost");
    match result {
        Err(MemoryError::NotFound(name)) => assert_eq!(name, "ghost"),
        other => panic!("Expected NotFound error, got {:?}", other),
    }
}

#[test]
fn test_double_free() {
    let mem_mgr = MemoryManager::new();

    mem_mgr.allocate("A", 10).unwrap();
    mem_mgr.free("A").unwrap();

    // Second free should fail
    let result = mem_mgr.free("A");
    assert_eq!(result.unwrap_err().kind(), ErrorKind::NotFound);
}

#[test]
fn test_free_never_leaves_adjacent_free_blocks() {
    let mem_mgr = MemoryManager::new();
    for (name, size) in [("A", 100), ("B", 100), ("C", 100), ("D", 100)] {
        mem_mgr.allocate(name, size).unwrap();
    }

    mem_mgr.free("B").unwrap();
    mem_mgr.free("D").unwrap(); // merges with the trailing free block
    assert_eq!(
        mem_mgr.snapshot().blocks,
        vec![
            occupied("A", 100),
            Block::free(100),
            occupied("C", 100),
            Block::free(724),
        ]
    );

    // Freeing C joins both neighbours into one block
    mem_mgr.free("C").unwrap();
    assert_eq!(
        mem_mgr.snapshot().blocks,
        vec![occupied("A", 100), Block::free(924)]
    );
    assert_eq!(mem_mgr.layout().check_invariants(), Ok(()));
}

#[test]
fn test_compact_reports_no_change_when_already_compact() {
    let mem_mgr = MemoryManager::new();
    mem_mgr.allocate("A", 100).unwrap();

    let outcome = mem_mgr.compact();
    assert!(matches!(outcome, Outcome::Compacted { changed: false, .. }));
    assert_eq!(
        outcome.snapshot().blocks,
        vec![occupied("A", 100), Block::free(924)]
    );
}

#[test]
fn test_relocate_reports_changed_then_unchanged() {
    let mem_mgr = MemoryManager::new();
    mem_mgr.allocate("A", 100).unwrap();
    mem_mgr.allocate("B", 100).unwrap();
    mem_mgr.free("A").unwrap();

    let first = mem_mgr.relocate();
    assert!(matches!(first, Outcome::Relocated { changed: true, .. }));
    assert_eq!(
        first.snapshot().blocks,
        vec![occupied("B", 100), Block::free(924)]
    );

    let second = mem_mgr.relocate();
    assert!(matches!(second, Outcome::Relocated { changed: false, .. }));
    assert_eq!(second.snapshot(), first.snapshot());
}

#[test]
fn test_compact_preserves_order_and_sizes() {
    let mem_mgr = MemoryManager::new();
    for (name, size) in [("A", 10), ("B", 20), ("C", 30), ("D", 40)] {
        mem_mgr.allocate(name, size).unwrap();
    }
    mem_mgr.free("A").unwrap();
    mem_mgr.free("C").unwrap();

    let before = mem_mgr.layout().processes();
    mem_mgr.compact();
    let after = mem_mgr.layout().processes();

    assert_eq!(before, after);
    assert!(mem_mgr.layout().is_compact());
}

#[test]
fn test_swap_out_accounting() {
    let mem_mgr = MemoryManager::new();
    mem_mgr.allocate("A", 300).unwrap();
    mem_mgr.allocate("B", 200).unwrap();
    let used_before = mem_mgr.stats().used_memory;

    let outcome = mem_mgr.swap_out("A").unwrap();
    match &outcome {
        Outcome::SwappedOut { entry, .. } => {
            assert_eq!(entry.name, "A");
            assert_eq!(entry.size, 300);
        }
        other => panic!("Expected SwappedOut outcome, got {:?}", other),
    }

    let stats = mem_mgr.stats();
    assert_eq!(stats.used_memory, used_before - 300);
    assert_eq!(stats.swapped_processes, 1);
    assert_eq!(stats.swapped_memory, 300);
    assert_eq!(mem_mgr.swapped().len(), 1);

    // The freed span is ordinary free space for anyone
    mem_mgr.allocate("C", 300).unwrap();
    assert_eq!(mem_mgr.layout().offset_of("C"), Some(0));
}

#[test]
fn test_swap_out_unknown_process() {
    let mem_mgr = MemoryManager::new();
    assert_eq!(
        mem_mgr.swap_out("ghost").unwrap_err(),
        MemoryError::NotFound("ghost".into())
    );
    assert!(mem_mgr.swap_entries().is_empty());
}

#[test]
fn test_reallocating_a_swapped_name_is_fresh() {
    let mem_mgr = MemoryManager::new();
    mem_mgr.allocate("A", 100).unwrap();
    mem_mgr.swap_out("A").unwrap();

    mem_mgr.allocate("A", 50).unwrap();
    mem_mgr.swap_out("A").unwrap();

    let entries = mem_mgr.swap_entries();
    assert_eq!(entries.len(), 2);
    assert_eq!(entries[0].size, 100);
    assert_eq!(entries[1].size, 50);
}

#[test]
fn test_memory_stats() {
    let mem_mgr = MemoryManager::new();

    mem_mgr.allocate("A", 256).unwrap();
    mem_mgr.allocate("B", 256).unwrap();
    mem_mgr.free("A").unwrap();

    let stats = mem_mgr.stats();
    assert_eq!(stats.total_memory, 1024);
    assert_eq!(stats.used_memory, 256);
    assert_eq!(stats.available_memory, 768);
    assert_eq!(stats.occupied_blocks, 1);
    assert_eq!(stats.free_blocks, 2);
    assert_eq!(stats.largest_free_block, 512);
    assert!((stats.usage_percentage - 25.0).abs() < 0.001);
    assert!((stats.external_fragmentation() - (1.0 - 512.0 / 768.0)).abs() < 0.001);
}

#[test]
fn test_memory_pressure_thresholds() {
    let mem_mgr = MemoryManager::new();

    mem_mgr.allocate("A", 512).unwrap();
    assert_eq!(mem_mgr.pressure(), MemoryPressure::Low);

    // 85% used
    mem_mgr.allocate("B", 359).unwrap();
    assert_eq!(mem_mgr.pressure(), MemoryPressure::High);

    mem_mgr.allocate("C", 153).unwrap();
    assert_eq!(mem_mgr.pressure(), MemoryPressure::Critical);
}

#[test]
fn test_custom_thresholds() {
    let config = MemoryConfig::new(100)
        .unwrap()
        .with_thresholds(0.70, 0.90)
        .unwrap();
    let mem_mgr = MemoryManager::with_config(config).unwrap();

    mem_mgr.allocate("A", 75).unwrap();
    assert_eq!(mem_mgr.pressure(), MemoryPressure::High);
}

#[test]
fn test_concurrent_allocations() {
    use std::sync::Arc;
    use std::thread;

    let mem_mgr = Arc::new(MemoryManager::new());
    let mut handles = vec![];

    // Spawn multiple threads allocating memory
    for i in 0..10 {
        let mem_mgr_clone = Arc::clone(&mem_mgr);
        let handle = thread::spawn(move || {
            mem_mgr_clone.allocate(&format!("P{}", i), 64).unwrap();
        });
        handles.push(handle);
    }

    // Wait for all threads
    for handle in handles {
        handle.join().unwrap();
    }

    let (_, used, _) = mem_mgr.info();
    assert_eq!(used, 640);
    assert_eq!(mem_mgr.layout().check_invariants(), Ok(()));
}

#[test]
fn test_cloned_handles_share_session() {
    let mem_mgr = MemoryManager::new();
    let other = mem_mgr.clone();

    other.allocate("A", 10).unwrap();
    assert!(mem_mgr.layout().contains("A"));
    assert_eq!(mem_mgr.free("A").unwrap().snapshot(), &other.snapshot());
}

#[test]
fn test_allocate_outcome_carries_owner_name() {
    let mem_mgr = MemoryManager::new();

    let outcome = mem_mgr.allocate("db-worker", 64).unwrap();
    match &outcome {
        Outcome::Allocated { name, snapshot, .. } => {
            assert_eq!(name, "db-worker");
            assert_eq!(snapshot.blocks[0].name(), Some(name));
        }
        other => panic!("Expected Allocated outcome, got {:?}", other),
    }

    // Rejected before the session is touched
    let before = mem_mgr.layout();
    assert!(matches!(
        mem_mgr.allocate("bad\tname", 8),
        Err(MemoryError::InvalidInput(InvalidInput::MalformedName(_)))
    ));
    assert_eq!(mem_mgr.layout(), before);
}

/// Walkthrough written only against the simulator traits
fn run_walkthrough<S: MemorySimulator>(sim: &S) -> Vec<SwapEntry> {
    sim.allocate("A", 300).unwrap();
    sim.allocate("B", 200).unwrap();
    sim.free("A").unwrap();
    assert!(sim.allocate("C", 1000).is_err());

    assert!(sim.compact().changed());
    assert!(!sim.relocate().changed());

    // Clones are handles onto the same session
    let other = sim.clone();
    other.swap_out("B").unwrap();

    assert_eq!(sim.snapshot().blocks, vec![Block::free(1024)]);
    assert_eq!(sim.stats().used_memory, 0);
    assert_eq!(sim.pressure(), MemoryPressure::Low);
    sim.swapped()
}

#[test]
fn test_session_through_simulator_traits() {
    let mem_mgr = MemoryManager::new();
    let swapped = run_walkthrough(&mem_mgr);

    assert_eq!(
        swapped,
        vec![SwapEntry {
            name: ProcessName::new("B").unwrap(),
            size: 200,
        }]
    );
    assert_eq!(mem_mgr.swap_entries(), swapped);
}
