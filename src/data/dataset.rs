use burn::data::dataset::Dataset;
use serde::{Deserialize, Serialize};

/// One encoded, padded training sample.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewSample {
    /// Token ids, already padded to the model's maxlen
    pub token_ids: Vec<u32>,
    /// 1 = positive, 0 = negative
    pub label: u8,
}

pub struct ReviewDataset {
    samples: Vec<ReviewSample>,
}

impl ReviewDataset {
    pub fn new(samples: Vec<ReviewSample>) -> Self { Self { samples } }

    pub fn sample_count(&self) -> usize { self.samples.len() }

    pub fn positive_count(&self) -> usize {
        self.samples.iter().filter(|s| s.label == 1).count()
    }
}

impl Dataset<ReviewSample> for ReviewDataset {
    fn get(&self, index: usize) -> Option<ReviewSample> {
        self.samples.get(index).cloned()
    }

    fn len(&self) -> usize {
        self.samples.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dataset_access() {
        let ds = ReviewDataset::new(vec![
            ReviewSample { token_ids: vec![0, 4], label: 1 },
            ReviewSample { token_ids: vec![5, 6], label: 0 },
        ]);
        assert_eq!(ds.len(), 2);
        assert_eq!(ds.positive_count(), 1);
        assert_eq!(ds.get(1).unwrap().token_ids, vec![5, 6]);
        assert!(ds.get(2).is_none());
    }
}
