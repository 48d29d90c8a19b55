use catalog::{Catalog, CatalogError, Certificate, CertificateInput};

use super::{
    FormView, Row, display_datetime, empty_cell,
    forms::{
        DATE_INPUT, DATETIME_INPUT, Field, FormData, Input, optional_date, optional_datetime,
        optional_int,
    },
    registry::ModelAdmin,
};

fn cell(certificate: &Certificate, app_name: &str, column: &str) -> String {
    match column {
        "app" => app_name.to_string(),
        "certificate_name" => certificate.certificate_name.clone(),
        "certificate_number" => certificate.certificate_number.clone(),
        "issued_by" => certificate.issued_by.clone(),
        "issue_date" => display_datetime(&certificate.issue_date),
        "expiry_date" => certificate
            .expiry_date
            .map(|date| date.format(DATE_INPUT).to_string())
            .unwrap_or_else(empty_cell),
        _ => empty_cell(),
    }
}

pub async fn rows(catalog: &Catalog, admin: &ModelAdmin) -> Result<Vec<Row>, CatalogError> {
    Ok(catalog
        .list_certificates()
        .await?
        .iter()
        .map(|(certificate, app_name)| Row {
            id: certificate.id,
            cells: admin
                .list_display
                .iter()
                .map(|c| cell(certificate, app_name, c))
                .collect(),
        })
        .collect())
}

pub async fn initial(catalog: &Catalog, id: Option<i32>) -> Result<FormData, CatalogError> {
    let mut data = FormData::default();
    if let Some(id) = id {
        let certificate = catalog.certificate(id).await?;
        data.push("app", certificate.app_id.to_string());
        data.push("certificate_name", certificate.certificate_name);
        data.push("certificate_number", certificate.certificate_number);
        data.push("issued_by", certificate.issued_by);
        data.push(
            "issue_date",
            certificate.issue_date.format(DATETIME_INPUT).to_string(),
        );
        if let Some(expiry) = certificate.expiry_date {
            data.push("expiry_date", expiry.format(DATE_INPUT).to_string());
        }
    }
    Ok(data)
}

pub async fn form(catalog: &Catalog, data: &FormData) -> Result<FormView, CatalogError> {
    let apps = catalog
        .list_apps()
        .await?
        .into_iter()
        .map(|app| (app.id.to_string(), app.name));

    Ok(FormView {
        fields: vec![
            Field::new("app", Input::Select, data)
                .required()
                .choices(apps, data),
            Field::new("certificate_name", Input::Text, data).required(),
            Field::new("certificate_number", Input::Text, data).required(),
            Field::new("issued_by", Input::Text, data).required(),
            Field::new("issue_date", Input::DateTime, data),
            Field::new("expiry_date", Input::Date, data),
        ],
        inlines: Vec::new(),
    })
}

pub async fn save(
    catalog: &Catalog,
    id: Option<i32>,
    data: &FormData,
) -> Result<i32, CatalogError> {
    let app_id = optional_int(data, "app", "app")?
        .ok_or_else(|| CatalogError::Validation("app: this field is required".to_string()))?;
    let input = CertificateInput {
        app_id,
        certificate_name: data.value("certificate_name").to_string(),
        certificate_number: data.value("certificate_number").to_string(),
        issued_by: data.value("issued_by").to_string(),
        issue_date: optional_datetime(data, "issue_date", "issue date")?,
        expiry_date: optional_date(data, "expiry_date", "expiry date")?,
    };
    let certificate = match id {
        None => catalog.create_certificate(input).await?,
        Some(id) => catalog.update_certificate(id, input).await?,
    };
    Ok(certificate.id)
}
