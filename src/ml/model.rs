use burn::{
    nn::{
        loss::BinaryCrossEntropyLossConfig,
        Embedding, EmbeddingConfig,
        Linear, LinearConfig,
    },
    prelude::*,
    tensor::activation::{relu, sigmoid},
};

// NOTE: #[derive(Config)] already generates Clone and Serialize/Deserialize
// internally; do NOT add them again or you get conflicting impls.
#[derive(Config, Debug)]
pub struct SentimentRnnConfig {
    /// Rows in the embedding table; token ids must be below this
    pub vocab_size: usize,
    #[config(default = 128)]
    pub embed_dim:  usize,
    #[config(default = 128)]
    pub hidden_dim: usize,
}

impl SentimentRnnConfig {
    pub fn init<B: Backend>(&self, device: &B::Device) -> SentimentRnn<B> {
        let embedding = EmbeddingConfig::new(self.vocab_size, self.embed_dim).init(device);
        let rnn = SimpleRnn {
            input:      LinearConfig::new(self.embed_dim, self.hidden_dim).init(device),
            recurrent:  LinearConfig::new(self.hidden_dim, self.hidden_dim)
                .with_bias(false)
                .init(device),
            hidden_dim: self.hidden_dim,
        };
        let output = LinearConfig::new(self.hidden_dim, 1).init(device);
        SentimentRnn { embedding, rnn, output }
    }
}

/// Fully-connected Elman RNN with ReLU activation:
///
///   h_t = relu(W_x · x_t + b + W_h · h_{t-1}),  h_0 = 0
///
/// Only the final hidden state is returned.
#[derive(Module, Debug)]
pub struct SimpleRnn<B: Backend> {
    pub input:      Linear<B>,
    pub recurrent:  Linear<B>,
    pub hidden_dim: usize,
}

impl<B: Backend> SimpleRnn<B> {
    /// x: [batch, seq_len, embed_dim] → [batch, hidden_dim]
    pub fn forward(&self, x: Tensor<B, 3>) -> Tensor<B, 2> {
        let [batch_size, seq_len, _] = x.dims();

        // The input projection has no time dependency, do it for all steps at once.
        let projected = self.input.forward(x); // [batch, seq_len, hidden]

        let mut h = Tensor::<B, 2>::zeros([batch_size, self.hidden_dim], &projected.device());
        for t in 0..seq_len {
            let x_t = projected
                .clone()
                .slice([0..batch_size, t..t + 1, 0..self.hidden_dim])
                .reshape([batch_size, self.hidden_dim]);
            h = relu(x_t + self.recurrent.forward(h));
        }
        h
    }
}

#[derive(Module, Debug)]
pub struct SentimentRnn<B: Backend> {
    pub embedding: Embedding<B>,
    pub rnn:       SimpleRnn<B>,
    pub output:    Linear<B>,
}

impl<B: Backend> SentimentRnn<B> {
    /// token_ids: [batch, seq_len] → logits: [batch]
    pub fn forward(&self, token_ids: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        let [batch_size, _] = token_ids.dims();
        let embedded = self.embedding.forward(token_ids);
        let hidden   = self.rnn.forward(embedded);
        self.output.forward(hidden).reshape([batch_size])
    }

    /// Probability that each review is positive: [batch]
    pub fn forward_probabilities(&self, token_ids: Tensor<B, 2, Int>) -> Tensor<B, 1> {
        sigmoid(self.forward(token_ids))
    }

    /// Binary cross-entropy on logits against 0/1 labels.
    pub fn forward_loss(
        &self,
        token_ids: Tensor<B, 2, Int>,
        labels:    Tensor<B, 1, Int>,
    ) -> (Tensor<B, 1>, Tensor<B, 1>) {
        let logits = self.forward(token_ids);
        let bce = BinaryCrossEntropyLossConfig::new()
            .with_logits(true)
            .init(&logits.device());
        let loss = bce.forward(logits.clone(), labels);
        (loss, logits)
    }
}
