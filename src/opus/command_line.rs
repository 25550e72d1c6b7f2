use std::collections::BTreeMap;
use std::fmt;

use log::{error, warn};

use super::constants::KEYWORD_CMDLINE;

/// A parsed `COMMAND_LINE` log entry.
///
/// ```text
/// COMMAND_LINE MeasureSample(["::this::":Meas];{SNM='X1', GAI=4})
///              ^operation     ^type            ^key=value list
/// ```
///
/// Commas inside single quotes do not split values, and the quotes are dropped.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandLineData {
    /// The log entry as found in the file
    pub raw: String,
    /// Operation name
    pub operation: String,
    /// Bracketed type tag with the `"::this::":` prefix removed
    pub cmd_type: String,
    /// Key/value pairs
    pub values: BTreeMap<String, String>,
}

impl CommandLineData {
    /// Parse a command line. Malformed input is logged and leaves the fields that could
    /// not be parsed empty.
    pub fn new(raw: &str) -> Self {
        let mut data = Self {
            raw: raw.to_string(),
            ..Self::default()
        };

        if let Err(reason) = data.parse() {
            error!("Failed to parse command line ({}): {}", reason, raw);
        }

        data
    }

    fn parse(&mut self) -> Result<(), &'static str> {
        let open = self.raw.find('(').ok_or("missing '('")?;
        let close = self.raw.rfind(')').ok_or("missing ')'")?;
        if close < open {
            return Err("')' before '('");
        }

        let intro = &self.raw[..open];
        let payload = &self.raw[open + 1..close];

        let keyword = intro.find(KEYWORD_CMDLINE).ok_or("missing keyword")?;
        let operation = intro[keyword + KEYWORD_CMDLINE.len()..].trim().to_string();

        let type_start = payload.find('[').ok_or("missing '['")?;
        let type_end = payload.find(']').ok_or("missing ']'")?;
        let cmd_type = payload
            .get(type_start + 1..type_end)
            .ok_or("']' before '['")?
            .replace("\"::this::\":", "");

        let data_start = payload.find('{').ok_or("missing '{'")?;
        let data_end = payload.rfind('}').ok_or("missing '}'")?;
        let data = payload
            .get(data_start + 1..data_end)
            .ok_or("'}' before '{'")?;

        self.operation = operation;
        self.cmd_type = cmd_type;
        self.values = split_pairs(data)
            .into_iter()
            .filter_map(|pair| match pair.split_once('=') {
                Some((key, value)) => Some((key.trim().to_string(), value.trim().to_string())),
                None => {
                    warn!("Invalid key-value pair: '{}'", pair);
                    None
                }
            })
            .collect();

        Ok(())
    }

    /// Number of key/value pairs
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// Whether no key/value pairs were parsed
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// Whether `key` is present
    pub fn has(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// Value of `key`
    pub fn get(&self, key: &str) -> Option<&str> {
        self.values.get(key).map(String::as_str)
    }
}

impl fmt::Display for CommandLineData {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "operation={}, type={}, values={:?}",
            self.operation, self.cmd_type, self.values
        )
    }
}

/// Split on commas outside single quotes, dropping the quotes and empty pieces
fn split_pairs(data: &str) -> Vec<String> {
    let mut pairs = Vec::new();
    let mut current = String::new();
    let mut quoted = false;

    for c in data.chars() {
        match c {
            '\'' => quoted = !quoted,
            ',' if !quoted => {
                if !current.is_empty() {
                    pairs.push(current.trim().to_string());
                }
                current.clear();
            }
            _ => current.push(c),
        }
    }

    if !current.is_empty() {
        pairs.push(current.trim().to_string());
    }

    pairs
}
