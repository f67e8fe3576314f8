use std::fmt;
use std::rc::Rc;

// ---------------------------------------------------------------------------
// CellValue – a single field of a CSV row
// ---------------------------------------------------------------------------

/// A dynamically-typed CSV field after numeric coercion.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Text(s) => write!(f, "{s}"),
            CellValue::Number(v) => write!(f, "{v}"),
        }
    }
}

impl CellValue {
    /// Numeric view of the cell. Text cells are not numbers and read as NaN.
    pub fn as_f64(&self) -> f64 {
        match self {
            CellValue::Number(v) => *v,
            CellValue::Text(_) => f64::NAN,
        }
    }
}

// ---------------------------------------------------------------------------
// Row – one parsed CSV record keyed by header
// ---------------------------------------------------------------------------

/// One CSV record as an ordered header → value mapping.
///
/// Order follows the header row, so lookups that scan the keys are
/// deterministic and the first matching header wins. Header names are
/// shared with the stream that produced the row.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Row {
    pub fields: Vec<(Rc<str>, CellValue)>,
}

impl Row {
    /// Value under the first header key (the timestamp column).
    pub fn first_value(&self) -> Option<&CellValue> {
        self.fields.first().map(|(_, v)| v)
    }

    /// Value of the first column whose header contains `keyword`.
    /// Matching is a case-sensitive substring test.
    pub fn find_by_keyword(&self, keyword: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(header, _)| header.contains(keyword))
            .map(|(_, v)| v)
    }
}

// ---------------------------------------------------------------------------
// Channel – the three mains readings
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Channel {
    A,
    B,
    C,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::A, Channel::B, Channel::C];

    /// Header keyword used to locate the channel's column.
    pub fn keyword(self) -> &'static str {
        match self {
            Channel::A => "Mains_A",
            Channel::B => "Mains_B",
            Channel::C => "Mains_C",
        }
    }

    /// Series name shown in the chart legend.
    pub fn display_name(self) -> &'static str {
        match self {
            Channel::A => "Mains A (kWhs)",
            Channel::B => "Mains B (kWhs)",
            Channel::C => "Mains C (kWhs)",
        }
    }
}

/// Sum of the three readings where a NaN reading contributes zero.
pub fn row_sum(a: f64, b: f64, c: f64) -> f64 {
    [a, b, c].into_iter().filter(|v| !v.is_nan()).sum()
}

// ---------------------------------------------------------------------------
// SeriesSet – the extracted, aligned sequences
// ---------------------------------------------------------------------------

/// Timestamp labels plus the three channel series, all the same length,
/// and the largest per-row channel sum seen so far.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SeriesSet {
    pub labels: Vec<String>,
    pub mains_a: Vec<f64>,
    pub mains_b: Vec<f64>,
    pub mains_c: Vec<f64>,
    /// Never negative, never decreases.
    pub max_sum: f64,
}

impl SeriesSet {
    /// Append one retained row and fold its sum into the running maximum.
    pub fn push(&mut self, label: String, a: f64, b: f64, c: f64) {
        self.labels.push(label);
        self.mains_a.push(a);
        self.mains_b.push(b);
        self.mains_c.push(c);

        let sum = row_sum(a, b, c);
        if sum > self.max_sum {
            self.max_sum = sum;
        }
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn channel(&self, channel: Channel) -> &[f64] {
        match channel {
            Channel::A => &self.mains_a,
            Channel::B => &self.mains_b,
            Channel::C => &self.mains_c,
        }
    }

    /// Text for the summary label under the toolbar.
    pub fn summary_text(&self) -> String {
        format!("Max Sum of Mains A, B, C: {:.4} kWhs", self.max_sum)
    }
}
