use std::io::Read;
use std::rc::Rc;

use super::error::ExtractError;
use super::model::{CellValue, Row};

// ---------------------------------------------------------------------------
// RowStream – incremental CSV producer
// ---------------------------------------------------------------------------

/// Lazily yields one [`Row`] per CSV record.
///
/// Only the current record is held in memory. Bytes that are not valid
/// UTF-8 are replaced with U+FFFD rather than failing the file; only a
/// stream the reader cannot read at all is fatal. The stream is
/// single-pass: once a fatal error has been yielded it stops.
pub struct RowStream<R: Read> {
    headers: Vec<Rc<str>>,
    records: csv::ByteRecordsIntoIter<R>,
    record_no: u64,
    failed: bool,
}

impl<R: Read> RowStream<R> {
    /// Read the header row and prepare to stream the data records.
    ///
    /// Record lengths may differ from the header: a short record produces a
    /// row without the trailing keys, extra fields are dropped.
    pub fn new(source: R) -> Result<Self, ExtractError> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(source);

        let headers: Vec<Rc<str>> = reader
            .byte_headers()
            .map_err(ExtractError::Header)?
            .iter()
            .map(|h| Rc::from(String::from_utf8_lossy(h)))
            .collect();

        Ok(Self {
            headers,
            records: reader.into_byte_records(),
            record_no: 0,
            failed: false,
        })
    }

    pub fn headers(&self) -> &[Rc<str>] {
        &self.headers
    }
}

impl<R: Read> Iterator for RowStream<R> {
    type Item = Result<Row, ExtractError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let result = self.records.next()?;
        self.record_no += 1;

        match result {
            Ok(record) => {
                let fields = self
                    .headers
                    .iter()
                    .zip(record.iter())
                    .map(|(h, v)| (Rc::clone(h), coerce(&String::from_utf8_lossy(v))))
                    .collect();
                Some(Ok(Row { fields }))
            }
            Err(source) => {
                self.failed = true;
                Some(Err(ExtractError::Record {
                    record: self.record_no,
                    source,
                }))
            }
        }
    }
}

/// Numeric-looking fields become numbers, everything else stays text.
///
/// Only finite values count as numeric, so `NaN` or `inf` in a file are
/// kept as text (and read back as NaN by the channel lookup).
pub fn coerce(raw: &str) -> CellValue {
    match raw.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => CellValue::Number(v),
        _ => CellValue::Text(raw.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn coerce_numbers_and_text() {
        assert_eq!(coerce("1.5"), CellValue::Number(1.5));
        assert_eq!(coerce("0"), CellValue::Number(0.0));
        assert_eq!(coerce(" -2e3 "), CellValue::Number(-2000.0));
        assert_eq!(coerce("NaN"), CellValue::Text("NaN".into()));
        assert_eq!(coerce("inf"), CellValue::Text("inf".into()));
        assert_eq!(coerce(""), CellValue::Text(String::new()));
        assert_eq!(
            coerce("2024-01-01T00:00"),
            CellValue::Text("2024-01-01T00:00".into())
        );
    }

    #[test]
    fn rows_follow_header_order() {
        let data = "Time,Mains_A,Note\nt0,1,hello\n";
        let mut stream = RowStream::new(data.as_bytes()).unwrap();
        let headers: Vec<&str> = stream.headers().iter().map(|h| &**h).collect();
        assert_eq!(headers, ["Time", "Mains_A", "Note"]);

        let row = stream.next().unwrap().unwrap();
        let keys: Vec<&str> = row.fields.iter().map(|(h, _)| &**h).collect();
        assert_eq!(keys, ["Time", "Mains_A", "Note"]);
        assert_eq!(row.fields[1].1, CellValue::Number(1.0));
        assert!(stream.next().is_none());
    }

    #[test]
    fn short_record_lacks_trailing_keys() {
        let data = "Time,Mains_A,Mains_B,Mains_C\nt0,1,2\nt1,1,2,3,99\n";
        let rows: Vec<Row> = RowStream::new(data.as_bytes())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].fields.len(), 3);
        assert!(rows[0].find_by_keyword("Mains_C").is_none());
        assert_eq!(rows[1].fields.len(), 4);
    }

    #[test]
    fn invalid_utf8_field_is_replaced_and_row_kept() {
        let data = b"Time,Mains_A,Mains_B,Mains_C,Note\n\
                     t0,1,2,3,ok\n\
                     t1,4,5,6,20\xb0C\n\
                     t2,1,1,1,ok\n";
        let rows: Vec<Row> = RowStream::new(&data[..])
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1].find_by_keyword("Mains_C"), Some(&CellValue::Number(6.0)));
        assert_eq!(
            rows[1].find_by_keyword("Note"),
            Some(&CellValue::Text("20\u{FFFD}C".into()))
        );
    }

    #[test]
    fn latin1_header_is_decoded_lossily() {
        let data = b"Time,Temp \xb0C,Mains_A,Mains_B,Mains_C\nt0,21,1,2,3\n";
        let mut stream = RowStream::new(&data[..]).unwrap();
        assert_eq!(&*stream.headers()[1], "Temp \u{FFFD}C");

        let row = stream.next().unwrap().unwrap();
        assert_eq!(row.find_by_keyword("Mains_B"), Some(&CellValue::Number(2.0)));
        assert!(stream.next().is_none());
    }

    #[test]
    fn rows_share_header_names() {
        let data = "Time,Mains_A\nt0,1\nt1,2\n";
        let rows: Vec<Row> = RowStream::new(data.as_bytes())
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();
        assert!(Rc::ptr_eq(&rows[0].fields[1].0, &rows[1].fields[1].0));
    }

    #[test]
    fn empty_input_has_no_rows() {
        let mut stream = RowStream::new(&b""[..]).unwrap();
        assert!(stream.headers().is_empty());
        assert!(stream.next().is_none());
    }
}
