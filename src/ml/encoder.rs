use serde::{Deserialize, Serialize};

/// Vocabulary of one categorical column, sorted. Encodes values one-hot.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryEncoder {
    classes: Vec<String>,
}

impl CategoryEncoder {
    pub fn fit<'a, I>(values: I) -> Self
    where
        I: IntoIterator<Item = Option<&'a str>>,
    {
        let mut classes: Vec<String> = values.into_iter().flatten().map(str::to_string).collect();
        classes.sort();
        classes.dedup();
        Self { classes }
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn index(&self, value: Option<&str>) -> Option<usize> {
        value.and_then(|v| self.classes.binary_search_by(|c| c.as_str().cmp(v)).ok())
    }

    /// Appends one slot per class. Unknown and missing values leave every
    /// slot at zero.
    pub fn encode_into(&self, value: Option<&str>, out: &mut Vec<f64>) {
        let hit = self.index(value);
        out.extend((0..self.classes.len()).map(|i| if Some(i) == hit { 1.0 } else { 0.0 }));
    }
}
