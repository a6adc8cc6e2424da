#[cfg(test)]
mod tests {
    use microtunrs::{create_scheduler, Scheduler, TuningTable};
    use microtunrs::note::PitchClass;
    use std::sync::Arc;

    #[test]
    fn test_scheduler_with_tuning_writer() {
        let scheduler = create_scheduler();
        let tuning = Arc::new(TuningTable::new());
        let writer = tuning.clone();

        let handle = scheduler
            .spawn("tuning-writer", move || {
                writer.set_offset(PitchClass::B, -11.73);
            })
            .unwrap();
        handle.join().expect("Task should have completed");

        assert_eq!(tuning.offset(PitchClass::B), -11.73);
    }

    #[test]
    fn test_multiple_tasks() {
        let scheduler = create_scheduler();
        let tuning = Arc::new(TuningTable::new());

        let handles: Vec<_> = PitchClass::ALL
            .iter()
            .map(|pc| {
                let tuning = tuning.clone();
                let pc = *pc;
                scheduler
                    .spawn(&format!("writer-{}", pc), move || {
                        tuning.set_offset(pc, pc.index() as f32);
                    })
                    .unwrap()
            })
            .collect();
        for handle in handles {
            handle.join().unwrap();
        }

        for pc in PitchClass::ALL {
            assert_eq!(tuning.offset(pc), pc.index() as f32);
        }
    }
}
