//! 检查号 (Accession Number) 生成

use std::sync::atomic::{AtomicU64, Ordering};

/// 为每个医嘱生成唯一检查号
pub trait AccessionNumberGenerator: Send + Sync {
    fn new_accession_number(&self) -> String;
}

/// 从配置的种子开始递增的检查号序列
#[derive(Debug)]
pub struct SequentialAccessionNumberGenerator {
    next: AtomicU64,
}

impl SequentialAccessionNumberGenerator {
    pub fn new(seed: u64) -> Self {
        Self {
            next: AtomicU64::new(seed),
        }
    }
}

impl Default for SequentialAccessionNumberGenerator {
    fn default() -> Self {
        Self::new(1)
    }
}

impl AccessionNumberGenerator for SequentialAccessionNumberGenerator {
    fn new_accession_number(&self) -> String {
        self.next.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;
    use std::thread;

    #[test]
    fn test_sequence_starts_at_seed() {
        let generator = SequentialAccessionNumberGenerator::new(1000);
        assert_eq!(generator.new_accession_number(), "1000");
        assert_eq!(generator.new_accession_number(), "1001");
    }

    #[test]
    fn test_unique_across_threads() {
        let generator = Arc::new(SequentialAccessionNumberGenerator::default());
        let handles: Vec<_> = (0..4)
            .map(|_| {
                let generator = generator.clone();
                thread::spawn(move || {
                    (0..250)
                        .map(|_| generator.new_accession_number())
                        .collect::<Vec<_>>()
                })
            })
            .collect();

        let mut numbers = HashSet::new();
        for handle in handles {
            numbers.extend(handle.join().unwrap());
        }
        assert_eq!(numbers.len(), 1000);
    }
}
