use super::{ConversionError, Type};
use crate::context::{parse_timezone, Context, Timezone};
use crate::value::{Value, DATETIME_FORMAT, DATE_FORMAT};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime};
use serde_json::Value as JsonValue;

/// Accepted layouts for naive date-time strings, tried in order
const NAIVE_DATETIME_FORMATS: [&str; 3] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
];

/// `date` and `datetime` columns.
///
/// Values are shifted into the context timezone before being formatted as
/// `Y-m-d` or `Y-m-d H:M:S`. Strings without an offset are read as local
/// times of that timezone.
#[derive(Debug, Clone, Copy)]
pub struct DateType {
    with_time: bool,
}

impl DateType {
    pub fn date() -> Self {
        Self { with_time: false }
    }

    pub fn datetime() -> Self {
        Self { with_time: true }
    }

    fn format(&self) -> &'static str {
        if self.with_time {
            DATETIME_FORMAT
        } else {
            DATE_FORMAT
        }
    }

    fn timezone(&self, context: &Context) -> Result<Timezone, ConversionError> {
        parse_timezone(context.timezone()).ok_or_else(|| ConversionError::InvalidTimezone {
            timezone: context.timezone().to_string(),
        })
    }

    fn parse(&self, input: &str, tz: &Timezone) -> Result<DateTime<FixedOffset>, ConversionError> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(input) {
            return Ok(tz.convert(&dt));
        }
        let naive = NAIVE_DATETIME_FORMATS
            .iter()
            .find_map(|fmt| NaiveDateTime::parse_from_str(input, fmt).ok())
            .or_else(|| {
                NaiveDate::parse_from_str(input, DATE_FORMAT)
                    .ok()
                    .and_then(|d| d.and_hms_opt(0, 0, 0))
            })
            .ok_or_else(|| ConversionError::failed(input, self.name(), "unrecognized date format"))?;
        tz.localize(&naive)
            .ok_or_else(|| ConversionError::failed(input, self.name(), "not representable in timezone"))
    }
}

impl Type for DateType {
    fn name(&self) -> &str {
        if self.with_time {
            "datetime"
        } else {
            "date"
        }
    }

    fn convert_to_wire(&self, value: &Value, context: &Context) -> Result<JsonValue, ConversionError> {
        let tz = self.timezone(context)?;
        let moment = match value {
            Value::Null | Value::Bool(false) => return Ok(JsonValue::Null),
            Value::String(s) if s.trim().is_empty() => return Ok(JsonValue::Null),
            Value::String(s) => self.parse(s.trim(), &tz)?,
            Value::Date(d) => d
                .and_hms_opt(0, 0, 0)
                .and_then(|naive| tz.localize(&naive))
                .ok_or_else(|| ConversionError::failed(&d.to_string(), self.name(), "invalid date"))?,
            Value::DateTime(dt) => tz.convert(dt),
            Value::Int(ts) => DateTime::from_timestamp(*ts, 0)
                .map(|utc| tz.convert(&utc))
                .ok_or_else(|| ConversionError::failed(&ts.to_string(), self.name(), "timestamp out of range"))?,
            other => return Err(ConversionError::invalid_type(other, self.name())),
        };
        Ok(JsonValue::String(moment.format(self.format()).to_string()))
    }

    fn convert_to_native(&self, value: &JsonValue, context: &Context) -> Result<Value, ConversionError> {
        let raw = match value {
            JsonValue::Null | JsonValue::Bool(false) => return Ok(Value::Null),
            JsonValue::String(s) if s.trim().is_empty() => return Ok(Value::Null),
            JsonValue::String(s) => s.trim(),
            other => return Err(ConversionError::invalid_type(&Value::from(other), self.name())),
        };
        let tz = self.timezone(context)?;
        let moment = self.parse(raw, &tz)?;
        if self.with_time {
            Ok(Value::DateTime(moment))
        } else {
            Ok(Value::Date(moment.date_naive()))
        }
    }
}
