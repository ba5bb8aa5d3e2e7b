//! Typed Zeek column values.

use std::net::IpAddr;

/// Declared column type from the `#types` directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ZeekType {
    String,
    Count,
    Int,
    Double,
    Addr,
    Port,
    Time,
    Interval,
    Bool,
    Enum,
    Subnet,
    Set(Box<ZeekType>),
    Vector(Box<ZeekType>),
    /// Unknown or missing type; kept as text
    Untyped,
}

impl ZeekType {
    /// Parse a type name such as `count` or `set[string]`.
    pub fn parse(name: &str) -> Self {
        let name = name.trim();
        if let Some(inner) = container_inner(name, "set") {
            return ZeekType::Set(Box::new(ZeekType::parse(inner)));
        }
        if let Some(inner) = container_inner(name, "vector") {
            return ZeekType::Vector(Box::new(ZeekType::parse(inner)));
        }
        match name {
            "string" | "pattern" | "func" | "file" => ZeekType::String,
            "count" | "counter" => ZeekType::Count,
            "int" => ZeekType::Int,
            "double" => ZeekType::Double,
            "addr" => ZeekType::Addr,
            "port" => ZeekType::Port,
            "time" => ZeekType::Time,
            "interval" => ZeekType::Interval,
            "bool" => ZeekType::Bool,
            "enum" => ZeekType::Enum,
            "subnet" => ZeekType::Subnet,
            _ => ZeekType::Untyped,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, ZeekType::Set(_) | ZeekType::Vector(_))
    }
}

fn container_inner<'a>(name: &'a str, container: &str) -> Option<&'a str> {
    name.strip_prefix(container)?
        .strip_prefix('[')?
        .strip_suffix(']')
}

/// One decoded column value. Unset and empty columns are represented by
/// the absence of a value, not by a variant.
#[derive(Debug, Clone, PartialEq)]
pub enum ZeekValue {
    Str(String),
    Count(u64),
    Int(i64),
    /// `double`, `time` and `interval` columns
    Double(f64),
    Addr(IpAddr),
    Port(u16),
    Bool(bool),
    List(Vec<ZeekValue>),
}

impl ZeekValue {
    /// Decode `raw` as `ty`. Containers are split on `set_separator`.
    pub fn parse(ty: &ZeekType, raw: &str, set_separator: &str) -> Result<Self, String> {
        match ty {
            ZeekType::Set(inner) | ZeekType::Vector(inner) => {
                let items = raw
                    .split(set_separator)
                    .map(|item| ZeekValue::parse(inner, item, set_separator))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(ZeekValue::List(items))
            }
            ZeekType::Count => raw
                .parse::<u64>()
                .map(ZeekValue::Count)
                .map_err(|_| format!("invalid count '{raw}'")),
            ZeekType::Int => raw
                .parse::<i64>()
                .map(ZeekValue::Int)
                .map_err(|_| format!("invalid int '{raw}'")),
            ZeekType::Double | ZeekType::Time | ZeekType::Interval => match raw.parse::<f64>() {
                Ok(v) if v.is_finite() => Ok(ZeekValue::Double(v)),
                _ => Err(format!("invalid number '{raw}'")),
            },
            ZeekType::Addr => raw
                .parse::<IpAddr>()
                .map(ZeekValue::Addr)
                .map_err(|_| format!("invalid address '{raw}'")),
            ZeekType::Port => raw
                .parse::<u16>()
                .map(ZeekValue::Port)
                .map_err(|_| format!("invalid port '{raw}'")),
            ZeekType::Bool => match raw {
                "T" => Ok(ZeekValue::Bool(true)),
                "F" => Ok(ZeekValue::Bool(false)),
                _ => Err(format!("invalid bool '{raw}'")),
            },
            ZeekType::String | ZeekType::Enum | ZeekType::Subnet | ZeekType::Untyped => {
                Ok(ZeekValue::Str(unescape(raw)))
            }
        }
    }

    /// Text form of a scalar; containers yield their first element.
    pub fn as_text(&self) -> Option<String> {
        match self {
            ZeekValue::Str(s) => Some(s.clone()),
            ZeekValue::Count(v) => Some(v.to_string()),
            ZeekValue::Int(v) => Some(v.to_string()),
            ZeekValue::Double(v) => Some(v.to_string()),
            ZeekValue::Addr(v) => Some(v.to_string()),
            ZeekValue::Port(v) => Some(v.to_string()),
            ZeekValue::Bool(v) => Some(if *v { "T" } else { "F" }.to_string()),
            ZeekValue::List(items) => items.first().and_then(ZeekValue::as_text),
        }
    }

    /// Numeric view, accepting untyped text.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            ZeekValue::Double(v) => Some(*v),
            ZeekValue::Count(v) => Some(*v as f64),
            ZeekValue::Int(v) => Some(*v as f64),
            ZeekValue::Port(v) => Some(f64::from(*v)),
            ZeekValue::Str(s) => s.parse::<f64>().ok().filter(|v| v.is_finite()),
            _ => None,
        }
    }

    /// Non-negative integer view, accepting untyped text.
    pub fn as_u64(&self) -> Option<u64> {
        match self {
            ZeekValue::Count(v) => Some(*v),
            ZeekValue::Int(v) => u64::try_from(*v).ok(),
            ZeekValue::Port(v) => Some(u64::from(*v)),
            ZeekValue::Str(s) => s.parse::<u64>().ok(),
            _ => None,
        }
    }

    pub fn as_port(&self) -> Option<u16> {
        self.as_u64().and_then(|v| u16::try_from(v).ok())
    }

    pub fn as_addr(&self) -> Option<IpAddr> {
        match self {
            ZeekValue::Addr(a) => Some(*a),
            ZeekValue::Str(s) => s.parse().ok(),
            _ => None,
        }
    }

    /// Scalars as a one-element list; containers as-is.
    pub fn items(&self) -> Vec<&ZeekValue> {
        match self {
            ZeekValue::List(items) => items.iter().collect(),
            other => vec![other],
        }
    }
}

/// Expand `\xHH` escapes as written by Zeek's ASCII writer.
pub fn unescape(raw: &str) -> String {
    if !raw.contains("\\x") {
        return raw.to_string();
    }

    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'\\' && bytes.get(i + 1) == Some(&b'x') {
            let hex = bytes.get(i + 2..i + 4).and_then(|h| std::str::from_utf8(h).ok());
            if let Some(byte) = hex.and_then(|h| u8::from_str_radix(h, 16).ok()) {
                out.push(byte);
                i += 4;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}
