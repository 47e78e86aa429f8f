// ============================================================
// Layer 4 — Review Batcher
// ============================================================
// Implements Burn's Batcher trait to stack a Vec<ReviewSample>
// into tensors for one forward pass.
//
//   Input:  N ReviewSamples, each padded to length S
//   Output: token_ids [N, S], labels [N]
//
// All samples are padded when they are built, so stacking is
// a flatten followed by a reshape.

use burn::{
    data::dataloader::batcher::Batcher,
    prelude::*,
};

use crate::data::dataset::ReviewSample;

#[derive(Debug, Clone)]
pub struct ReviewBatch<B: Backend> {
    /// Token id sequences, shape [batch_size, seq_len]
    pub token_ids: Tensor<B, 2, Int>,

    /// Ground truth labels, shape [batch_size]
    pub labels: Tensor<B, 1, Int>,
}

#[derive(Clone, Debug, Default)]
pub struct ReviewBatcher;

impl<B: Backend> Batcher<B, ReviewSample, ReviewBatch<B>> for ReviewBatcher {
    fn batch(&self, items: Vec<ReviewSample>, device: &B::Device) -> ReviewBatch<B> {
        let batch_size = items.len();
        let seq_len    = items.first().map(|s| s.token_ids.len()).unwrap_or(0);

        let ids_flat: Vec<i32> = items
            .iter()
            .flat_map(|s| s.token_ids.iter().map(|&x| x as i32))
            .collect();

        let labels: Vec<i32> = items
            .iter()
            .map(|s| s.label as i32)
            .collect();

        let token_ids = Tensor::<B, 1, Int>::from_ints(ids_flat.as_slice(), device)
            .reshape([batch_size, seq_len]);
        let labels = Tensor::<B, 1, Int>::from_ints(labels.as_slice(), device);

        ReviewBatch { token_ids, labels }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use burn::backend::NdArray;

    #[test]
    fn test_batch_shapes() {
        let device = Default::default();
        let items = vec![
            ReviewSample { token_ids: vec![0, 0, 4, 5], label: 1 },
            ReviewSample { token_ids: vec![0, 6, 7, 8], label: 0 },
            ReviewSample { token_ids: vec![9, 9, 9, 9], label: 1 },
        ];
        let batch: ReviewBatch<NdArray> = ReviewBatcher.batch(items, &device);

        assert_eq!(batch.token_ids.dims(), [3, 4]);
        assert_eq!(batch.labels.dims(), [3]);
        let labels: Vec<i64> = batch
            .labels
            .into_data()
            .convert::<i64>()
            .to_vec()
            .unwrap();
        assert_eq!(labels, vec![1, 0, 1]);
    }
}
