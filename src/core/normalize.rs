use serde_json::{Map, Value};

// 解析出的時間取決於解析當下，寫檔前一律清成 null

pub const METAR_TIME_FIELDS: &[&str] = &["time"];
pub const TAF_TIME_FIELDS: &[&str] = &["time", "start_time", "end_time"];
pub const FORECAST_TIME_FIELDS: &[&str] = &["start_time", "end_time"];
pub const PIREP_TIME_FIELDS: &[&str] = &["time"];

/// 將指定欄位設為 null，欄位不存在時會補上
pub fn clear_fields(map: &mut Map<String, Value>, fields: &[&str]) {
    for field in fields {
        map.insert((*field).to_string(), Value::Null);
    }
}

fn as_object_mut<'a>(value: &'a mut Value, what: &str) -> Result<&'a mut Map<String, Value>, String> {
    let type_name = json_type(value);
    value
        .as_object_mut()
        .ok_or_else(|| format!("{} must be a JSON object, got {}", what, type_name))
}

pub fn normalize_metar(data: &mut Value) -> Result<(), String> {
    clear_fields(as_object_mut(data, "data")?, METAR_TIME_FIELDS);
    Ok(())
}

/// 回傳處理過的預報時段數
pub fn normalize_taf(data: &mut Value) -> Result<usize, String> {
    let map = as_object_mut(data, "data")?;
    clear_fields(map, TAF_TIME_FIELDS);

    let periods = match map.get_mut("forecast") {
        Some(Value::Array(periods)) => periods,
        Some(other) => {
            return Err(format!(
                "data.forecast must be an array, got {}",
                json_type(other)
            ))
        }
        None => return Err("data.forecast is missing".to_string()),
    };

    for (i, period) in periods.iter_mut().enumerate() {
        clear_fields(
            as_object_mut(period, &format!("data.forecast[{}]", i))?,
            FORECAST_TIME_FIELDS,
        );
    }

    Ok(periods.len())
}

pub fn normalize_pirep(report: &mut Value) -> Result<(), String> {
    clear_fields(as_object_mut(report, "report")?, PIREP_TIME_FIELDS);
    Ok(())
}

/// 遞迴重建物件，使鍵值依字典序排列
pub fn sort_keys(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut entries: Vec<(String, Value)> = map.into_iter().collect();
            entries.sort_by(|a, b| a.0.cmp(&b.0));
            Value::Object(
                entries
                    .into_iter()
                    .map(|(key, val)| (key, sort_keys(val)))
                    .collect(),
            )
        }
        Value::Array(items) => Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
