use crate::models::{Parameter, Region};
use crate::utils::constants::{MISSING_MARKER, NOT_AVAILABLE};
use std::fmt;

/// Column labels read from the header line of one source file.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct HeaderKeys {
    keys: Vec<String>,
}

impl HeaderKeys {
    pub fn new(keys: Vec<String>) -> Self {
        Self { keys }
    }

    pub fn get(&self, index: usize) -> Option<&str> {
        self.keys.get(index).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.keys.iter().map(String::as_str)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataValue {
    Present(String),
    Missing,
}

impl DataValue {
    /// Empty tokens and the archive's `---` marker are missing values
    pub fn from_token(token: &str) -> Self {
        if token.is_empty() || token == MISSING_MARKER {
            DataValue::Missing
        } else {
            DataValue::Present(token.to_string())
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            DataValue::Present(value) => value,
            DataValue::Missing => NOT_AVAILABLE,
        }
    }

    pub fn is_missing(&self) -> bool {
        matches!(self, DataValue::Missing)
    }
}

impl fmt::Display for DataValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One labelled value from one year of one series.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DataRow {
    pub region: Region,
    pub parameter: Parameter,
    pub year: String,
    pub key: String,
    pub value: DataValue,
}

impl DataRow {
    pub fn new(
        region: Region,
        parameter: Parameter,
        year: impl Into<String>,
        key: impl Into<String>,
        value: DataValue,
    ) -> Self {
        Self {
            region,
            parameter,
            year: year.into(),
            key: key.into(),
            value,
        }
    }

    /// Output fields in column order
    pub fn fields(&self) -> [&str; 5] {
        [
            self.region.as_str(),
            self.parameter.as_str(),
            &self.year,
            &self.key,
            self.value.as_str(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_tokens() {
        assert_eq!(DataValue::from_token(""), DataValue::Missing);
        assert_eq!(DataValue::from_token("---"), DataValue::Missing);
        assert_eq!(DataValue::Missing.as_str(), "N/A");
    }

    #[test]
    fn test_other_tokens_pass_through() {
        for token in ["5.1", "-0.3", "--", "----", "N/A", "0"] {
            let value = DataValue::from_token(token);
            assert!(!value.is_missing(), "{token} should be kept");
            assert_eq!(value.as_str(), token);
        }
    }

    #[test]
    fn test_row_fields() {
        let row = DataRow::new(
            Region::Scotland,
            Parameter::Rainfall,
            "1910",
            "mar",
            DataValue::Present("101.2".to_string()),
        );

        assert_eq!(row.fields(), ["Scotland", "Rainfall", "1910", "mar", "101.2"]);
    }
}
