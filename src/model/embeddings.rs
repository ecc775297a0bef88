// src/model/embeddings.rs — Word embedding table loaded from text format

use std::collections::HashMap;
use std::path::Path;

use tracing::warn;

use crate::infra::errors::ScoreError;

/// Vector width of the published embedding files.
pub const EMBEDDING_DIM: usize = 300;

/// In-memory word-to-vector map parsed from the whitespace-separated text
/// format (optionally prefixed by a word2vec `count dim` header line).
#[derive(Debug, Clone, Default)]
pub struct EmbeddingTable {
    dim: usize,
    vectors: HashMap<String, Vec<f32>>,
}

impl EmbeddingTable {
    pub fn load(path: &Path) -> Result<Self, ScoreError> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    /// Lenient parse: malformed lines are dropped, not fatal. The vector
    /// width is fixed by the first well-formed line.
    pub fn parse(content: &str) -> Self {
        let mut lines = content.lines().peekable();
        if let Some(first) = lines.peek() {
            if is_word2vec_header(first) {
                lines.next();
            }
        }

        let mut table = Self::default();
        let mut skipped = 0usize;
        for line in lines {
            let mut parts = line.split_whitespace();
            let Some(word) = parts.next() else {
                continue;
            };
            let values: Result<Vec<f32>, _> = parts.map(str::parse::<f32>).collect();
            match values {
                Ok(values) if !values.is_empty() => {
                    if table.dim == 0 {
                        table.dim = values.len();
                    }
                    if values.len() == table.dim {
                        table.vectors.insert(word.to_string(), values);
                    } else {
                        skipped += 1;
                    }
                }
                _ => skipped += 1,
            }
        }
        if skipped > 0 {
            warn!("Skipped {skipped} malformed embedding lines");
        }
        table
    }

    pub fn get(&self, word: &str) -> Option<&[f32]> {
        self.vectors.get(word).map(Vec::as_slice)
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn len(&self) -> usize {
        self.vectors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vectors.is_empty()
    }

    /// Mean vector over the tokens present in the table. Tokens without an
    /// entry are ignored; if none match, the result is all zeros.
    pub fn average(&self, tokens: &[&str]) -> Vec<f32> {
        if self.dim == 0 {
            return Vec::new();
        }
        let mut sum = vec![0.0f32; self.dim];
        let mut matched = 0usize;
        for token in tokens {
            if let Some(vector) = self.get(token) {
                for (s, v) in sum.iter_mut().zip(vector) {
                    *s += v;
                }
                matched += 1;
            }
        }
        if matched > 0 {
            for s in &mut sum {
                *s /= matched as f32;
            }
        }
        sum
    }
}

fn is_word2vec_header(line: &str) -> bool {
    let fields: Vec<&str> = line.split_whitespace().collect();
    fields.len() == 2 && fields.iter().all(|f| f.parse::<usize>().is_ok())
}
