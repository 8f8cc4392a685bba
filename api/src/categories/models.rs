use chrono::NaiveDateTime;
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};
use uuid::Uuid;

/// Categories are free-form: besides `name`, whatever the client sent is kept
/// verbatim and echoed back at the top level of the document.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(flatten)]
    pub attributes: Map<String, JsonValue>,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct CategoryDraft {
    pub name: Option<String>,
    pub attributes: Map<String, JsonValue>,
}

/// Keys owned by the server, dropped from client bodies
const RESERVED_KEYS: [&str; 4] = ["id", "_id", "createdAt", "updatedAt"];

impl From<Map<String, JsonValue>> for CategoryDraft {
    fn from(mut body: Map<String, JsonValue>) -> Self {
        for key in RESERVED_KEYS {
            body.remove(key);
        }

        // A non-string name stays an ordinary attribute
        let name = match body.get("name") {
            Some(JsonValue::String(_)) => match body.remove("name") {
                Some(JsonValue::String(name)) => Some(name),
                _ => None,
            },
            _ => None,
        };

        CategoryDraft {
            name,
            attributes: body,
        }
    }
}

impl CategoryDraft {
    pub fn into_category(self, id: Uuid, now: NaiveDateTime) -> Category {
        Category {
            id,
            name: self.name,
            attributes: self.attributes,
            created_at: now,
            updated_at: now,
        }
    }
}

#[derive(Queryable, Selectable, Debug, Clone)]
#[diesel(table_name = crate::schema::categories)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct CategoryRow {
    pub id: Uuid,
    pub name: Option<String>,
    pub attributes: JsonValue,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<CategoryRow> for Category {
    fn from(row: CategoryRow) -> Self {
        let attributes = match row.attributes {
            JsonValue::Object(map) => map,
            _ => Map::new(),
        };

        Category {
            id: row.id,
            name: row.name,
            attributes,
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

#[derive(Insertable, Debug)]
#[diesel(table_name = crate::schema::categories)]
pub struct NewCategory {
    pub id: Uuid,
    pub name: Option<String>,
    pub attributes: JsonValue,
    pub created_at: NaiveDateTime,
    pub updated_at: NaiveDateTime,
}

impl From<Category> for NewCategory {
    fn from(category: Category) -> Self {
        NewCategory {
            id: category.id,
            name: category.name,
            attributes: JsonValue::Object(category.attributes),
            created_at: category.created_at,
            updated_at: category.updated_at,
        }
    }
}
