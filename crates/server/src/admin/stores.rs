use catalog::{Catalog, CatalogError, Store, StoreInput};

use super::{
    FormView, Row, empty_cell,
    forms::{Field, FormData, Input},
    registry::ModelAdmin,
};

const APP_VARIETIES: &str = "app_varieties";

fn cell(store: &Store, column: &str) -> String {
    match column {
        "name" => store.name.clone(),
        "mother_company" => store.mother_company.clone(),
        "contact_number" => store.contact_number.clone().unwrap_or_else(empty_cell),
        "email" => store.email.clone().unwrap_or_else(empty_cell),
        _ => empty_cell(),
    }
}

pub async fn rows(catalog: &Catalog, admin: &ModelAdmin) -> Result<Vec<Row>, CatalogError> {
    Ok(catalog
        .list_stores()
        .await?
        .iter()
        .map(|store| Row {
            id: store.id,
            cells: admin.list_display.iter().map(|c| cell(store, c)).collect(),
        })
        .collect())
}

pub async fn initial(catalog: &Catalog, id: Option<i32>) -> Result<FormData, CatalogError> {
    let mut data = FormData::default();
    if let Some(id) = id {
        let store = catalog.store(id).await?;
        data.push("name", store.name);
        data.push("mother_company", store.mother_company);
        data.push("contact_number", store.contact_number.unwrap_or_default());
        data.push("email", store.email.unwrap_or_default());
        for app_id in catalog.store_app_ids(id).await? {
            data.push(APP_VARIETIES, app_id.to_string());
        }
    }
    Ok(data)
}

pub async fn form(
    catalog: &Catalog,
    admin: &ModelAdmin,
    data: &FormData,
) -> Result<FormView, CatalogError> {
    let apps = catalog
        .list_apps()
        .await?
        .into_iter()
        .map(|app| (app.id.to_string(), app.name));

    Ok(FormView {
        fields: vec![
            Field::new("name", Input::Text, data).required(),
            Field::new("mother_company", Input::Text, data).required(),
            Field::new("contact_number", Input::Text, data),
            Field::new("email", Input::Email, data),
            Field::new(APP_VARIETIES, Input::SelectMultiple, data)
                .choices(apps, data)
                .widget(admin.widget(APP_VARIETIES)),
        ],
        inlines: Vec::new(),
    })
}

fn app_ids(data: &FormData) -> Result<Vec<i32>, CatalogError> {
    data.values(APP_VARIETIES)
        .into_iter()
        .map(|raw| {
            raw.trim().parse().map_err(|_| {
                CatalogError::Validation(format!("app varieties: {raw:?} is not a valid choice"))
            })
        })
        .collect()
}

pub async fn save(
    catalog: &Catalog,
    id: Option<i32>,
    data: &FormData,
) -> Result<i32, CatalogError> {
    let input = StoreInput {
        name: data.value("name").to_string(),
        mother_company: data.value("mother_company").to_string(),
        contact_number: Some(data.value("contact_number").to_string()),
        email: Some(data.value("email").to_string()),
        app_ids: app_ids(data)?,
    };
    let store = match id {
        None => catalog.create_store(input).await?,
        Some(id) => catalog.update_store(id, input).await?,
    };
    Ok(store.id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn selected_apps_are_parsed() {
        let mut data = FormData::default();
        data.push(APP_VARIETIES, "2");
        data.push(APP_VARIETIES, "5");
        assert_eq!(app_ids(&data).unwrap(), vec![2, 5]);

        data.push(APP_VARIETIES, "five");
        assert!(matches!(app_ids(&data), Err(CatalogError::Validation(_))));
    }

    #[test]
    fn missing_contact_shows_placeholder() {
        let store = Store {
            id: 1,
            name: "Corner".to_string(),
            mother_company: "Corner Group".to_string(),
            contact_number: None,
            email: Some("corner@example.com".to_string()),
        };
        assert_eq!(cell(&store, "contact_number"), empty_cell());
        assert_eq!(cell(&store, "email"), "corner@example.com");
    }
}
