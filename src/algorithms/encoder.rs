use crate::error::{RecommendError, RecommendResult};
use std::collections::{BTreeMap, HashMap};

/// Bijective mapping between the distinct values of one column and dense codes.
///
/// Codes are handed out in first-seen order, so fitting the same sequence twice
/// always yields the same table.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct EncodingTable {
    column: String,
    values: Vec<String>,
    codes: HashMap<String, usize>,
}

impl EncodingTable {
    pub fn fit<I, S>(column: &str, values: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut table = Self {
            column: column.to_string(),
            values: Vec::new(),
            codes: HashMap::new(),
        };

        for value in values {
            let value = value.as_ref();
            if !table.codes.contains_key(value) {
                table.codes.insert(value.to_string(), table.values.len());
                table.values.push(value.to_string());
            }
        }

        table
    }

    pub fn encode(&self, value: &str) -> RecommendResult<usize> {
        self.codes
            .get(value)
            .copied()
            .ok_or_else(|| RecommendError::UnknownCategory {
                column: self.column.clone(),
                value: value.to_string(),
            })
    }

    pub fn decode(&self, code: usize) -> RecommendResult<&str> {
        self.values
            .get(code)
            .map(String::as_str)
            .ok_or_else(|| RecommendError::UnknownCategory {
                column: self.column.clone(),
                value: format!("#{}", code),
            })
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// One [`EncodingTable`] per named column.
#[derive(Debug, Clone, Default)]
pub struct CategoryEncoder {
    tables: BTreeMap<String, EncodingTable>,
}

impl CategoryEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn fit_column<I, S>(&mut self, column: &str, values: I) -> &EncodingTable
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let table = EncodingTable::fit(column, values);
        self.tables.insert(column.to_string(), table);
        &self.tables[column]
    }

    pub fn encode(&self, column: &str, value: &str) -> RecommendResult<usize> {
        match self.tables.get(column) {
            Some(table) => table.encode(value),
            None => Err(RecommendError::UnknownCategory {
                column: column.to_string(),
                value: value.to_string(),
            }),
        }
    }

    pub fn decode(&self, column: &str, code: usize) -> RecommendResult<&str> {
        match self.tables.get(column) {
            Some(table) => table.decode(code),
            None => Err(RecommendError::UnknownCategory {
                column: column.to_string(),
                value: format!("#{}", code),
            }),
        }
    }

    pub fn columns(&self) -> impl Iterator<Item = &str> {
        self.tables.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_codes_follow_first_seen_order() {
        let table = EncodingTable::fit("Occasion", ["Party", "Formal", "Party", "Casual"]);
        assert_eq!(table.len(), 3);
        assert_eq!(table.encode("Party").unwrap(), 0);
        assert_eq!(table.encode("Formal").unwrap(), 1);
        assert_eq!(table.encode("Casual").unwrap(), 2);
    }

    #[test]
    fn test_refit_is_deterministic() {
        let values = ["Pear", "Apple", "Pear", "Rectangle"];
        assert_eq!(
            EncodingTable::fit("Body Shape", values),
            EncodingTable::fit("Body Shape", values)
        );
    }

    #[test]
    fn test_round_trip() {
        let table = EncodingTable::fit("Body Shape", ["Hourglass", "Pear", "Inverted Triangle"]);
        for value in table.values() {
            let code = table.encode(value).unwrap();
            assert_eq!(table.decode(code).unwrap(), value);
        }
    }

    #[test]
    fn test_unknown_value_is_rejected() {
        let table = EncodingTable::fit("Body Shape", ["Pear"]);
        assert_eq!(
            table.encode("Triangle"),
            Err(RecommendError::UnknownCategory {
                column: "Body Shape".to_string(),
                value: "Triangle".to_string(),
            })
        );
        assert!(table.decode(5).is_err());
    }

    #[test]
    fn test_encoder_requires_fitted_column() {
        let mut encoder = CategoryEncoder::new();
        encoder.fit_column("Occasion", ["Formal"]);
        assert_eq!(encoder.encode("Occasion", "Formal").unwrap(), 0);
        assert!(encoder.encode("Clothing Type", "Formal").is_err());
        assert_eq!(encoder.columns().collect::<Vec<_>>(), vec!["Occasion"]);
    }
}
