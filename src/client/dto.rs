// JSON envelope handling and row mapping for the NEIS open API.
//
// Every resource answers with
// `{ "<resource>": [ {"head": [...]}, {"row": [...]} ] }`, or with a bare
// top-level `RESULT` object when the request failed or matched nothing.
use crate::client::error::FetchError;
use crate::model::{MealMenu, MealType, School, SchoolType, TimetablePeriod};
use crate::segment::split_dishes;
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;

#[derive(Debug, Clone, Deserialize)]
pub struct SchoolRow {
    #[serde(rename = "ATPT_OFCDC_SC_CODE")]
    pub org_code: String,
    #[serde(rename = "SD_SCHUL_CODE")]
    pub school_code: String,
    #[serde(rename = "SCHUL_NM")]
    pub school_name: String,
    #[serde(rename = "SCHUL_KND_SC_NM", default)]
    pub school_kind: String,
}

impl SchoolRow {
    pub fn into_domain(self) -> School {
        School {
            school_type: SchoolType::from_kind(&self.school_kind),
            org_code: self.org_code,
            school_code: self.school_code,
            school_name: self.school_name,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct MealRow {
    #[serde(rename = "DDISH_NM", default)]
    pub dishes: String,
    #[serde(rename = "MMEAL_SC_NM", default)]
    pub meal_type: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TimetableRow {
    #[serde(rename = "PERIO", default)]
    pub period: Value,
    #[serde(rename = "ITRT_CNTNT", default)]
    pub content: String,
}

impl TimetableRow {
    /// `PERIO` normally arrives as a string. Anything that is not a positive
    /// integer maps to period 1.
    pub fn into_domain(self) -> TimetablePeriod {
        let parsed = match &self.period {
            Value::String(s) => s.trim().parse::<u32>().ok(),
            Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
            _ => None,
        };
        TimetablePeriod {
            period: parsed.filter(|p| *p >= 1).unwrap_or(1),
            content: self.content,
        }
    }
}

/// Parses a response body and returns the data rows of `resource`.
pub fn extract_rows<T: DeserializeOwned>(body: &[u8], resource: &str) -> Result<Vec<T>, FetchError> {
    let json: Value = serde_json::from_slice(body)
        .map_err(|e| FetchError::network(format!("malformed JSON: {}", e)))?;

    if let Some(result) = json.get("RESULT") {
        let code = result.get("CODE").and_then(Value::as_str).unwrap_or("?");
        let message = result.get("MESSAGE").and_then(Value::as_str).unwrap_or("");
        return Err(FetchError::network(format!("API result {}: {}", code, message)));
    }

    let rows = json
        .get(resource)
        .and_then(Value::as_array)
        .and_then(|sections| sections.get(1))
        .and_then(|data| data.get("row"))
        .ok_or_else(|| FetchError::network(format!("'{}' envelope has no data rows", resource)))?;

    serde_json::from_value(rows.clone())
        .map_err(|e| FetchError::network(format!("unexpected '{}' row shape: {}", resource, e)))
}

/// Partitions meal rows by type. On duplicates the last row wins.
pub fn meal_menu_from_rows(rows: Vec<MealRow>) -> MealMenu {
    let mut menu = MealMenu::default();
    for row in rows {
        let Some(meal) = MealType::from_label(&row.meal_type) else {
            log::debug!("Ignoring meal row with label '{}'", row.meal_type);
            continue;
        };
        let dishes = split_dishes(&row.dishes);
        match meal {
            MealType::Breakfast => menu.breakfast = dishes,
            MealType::Lunch => menu.lunch = dishes,
            MealType::Dinner => menu.dinner = dishes,
        }
    }
    menu
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn result_envelope_is_a_network_failure() {
        let body = br#"{"RESULT":{"CODE":"INFO-200","MESSAGE":"no data"}}"#;
        let err = extract_rows::<MealRow>(body, "mealServiceDietInfo").unwrap_err();
        assert_eq!(
            err,
            FetchError::NetworkFailure("API result INFO-200: no data".to_string())
        );
    }

    #[test]
    fn head_section_is_dropped() {
        let body = r#"{"schoolInfo":[
            {"head":[{"list_total_count":1},{"RESULT":{"CODE":"INFO-000","MESSAGE":"ok"}}]},
            {"row":[{"ATPT_OFCDC_SC_CODE":"B10","SD_SCHUL_CODE":"7010536","SCHUL_NM":"한빛고등학교","SCHUL_KND_SC_NM":"고등학교"}]}
        ]}"#;
        let rows = extract_rows::<SchoolRow>(body.as_bytes(), "schoolInfo").unwrap();
        assert_eq!(rows.len(), 1);
        let school = rows[0].clone().into_domain();
        assert_eq!(school.school_type, SchoolType::High);
        assert_eq!(school.org_code, "B10");
    }

    #[test]
    fn missing_row_section_fails() {
        let body = br#"{"schoolInfo":[{"head":[]}]}"#;
        assert!(matches!(
            extract_rows::<SchoolRow>(body, "schoolInfo"),
            Err(FetchError::NetworkFailure(_))
        ));
        assert!(matches!(
            extract_rows::<SchoolRow>(b"not json", "schoolInfo"),
            Err(FetchError::NetworkFailure(_))
        ));
    }

    #[test]
    fn last_row_per_meal_type_wins() {
        let rows = vec![
            MealRow {
                dishes: "쌀밥<br/>미역국".into(),
                meal_type: "중식".into(),
            },
            MealRow {
                dishes: "토스트".into(),
                meal_type: "조식".into(),
            },
            MealRow {
                dishes: "잡곡밥 <br/>된장국5.6.".into(),
                meal_type: "중식".into(),
            },
        ];
        let menu = meal_menu_from_rows(rows);
        assert_eq!(menu.breakfast, vec!["토스트"]);
        assert_eq!(menu.lunch, vec!["잡곡밥", "된장국5.6."]);
        assert!(menu.dinner.is_empty());
    }

    #[test]
    fn unparsable_period_defaults_to_one() {
        let row = |period: Value| TimetableRow {
            period,
            content: "자율".into(),
        };
        assert_eq!(row(Value::String("5".into())).into_domain().period, 5);
        assert_eq!(row(Value::String("x".into())).into_domain().period, 1);
        assert_eq!(row(Value::String("0".into())).into_domain().period, 1);
        assert_eq!(row(serde_json::json!(3)).into_domain().period, 3);
        assert_eq!(row(Value::Null).into_domain().period, 1);
    }
}
