//! Cut-set/product types surfaced to callers.

use crate::model::EventId;

/// One minimal cut set, optionally annotated with its own probability.
#[derive(Debug, Clone, PartialEq)]
pub struct Product {
    /// Basic-event ids in this cut set. A name prefixed with `¬` denotes a
    /// negated basic event (non-coherent models).
    pub members: Vec<EventId>,
    /// This cut set's own probability, if computed.
    pub probability: Option<f64>,
}

impl Product {
    /// The cut set's order: its number of members.
    pub fn order(&self) -> usize {
        self.members.len()
    }
}

/// A reported family of cut sets, e.g. the output of MOCUS after cutoff
/// truncation.
#[derive(Debug, Clone, Default)]
pub struct ProductCollection {
    pub products: Vec<Product>,
}

impl ProductCollection {
    pub fn len(&self) -> usize {
        self.products.len()
    }

    pub fn is_empty(&self) -> bool {
        self.products.is_empty()
    }

    /// Largest cut-set order present, or `0` for an empty collection.
    pub fn max_order(&self) -> usize {
        self.products.iter().map(Product::order).max().unwrap_or(0)
    }

    /// Sum of each product's own probability: the rare-event approximation
    /// when products carry independently-computed probabilities.
    pub fn total_probability_rare_event(&self) -> f64 {
        self.products.iter().filter_map(|p| p.probability).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn max_order_is_the_largest_cut_set_size() {
        let collection = ProductCollection {
            products: vec![
                Product { members: vec!["a".into()], probability: None },
                Product {
                    members: vec!["b".into(), "c".into()],
                    probability: None,
                },
            ],
        };
        assert_eq!(collection.max_order(), 2);
    }

    #[test]
    fn empty_collection_has_zero_max_order() {
        assert_eq!(ProductCollection::default().max_order(), 0);
    }
}
