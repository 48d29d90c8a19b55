//! Admin screens for app entries, with their reviews edited inline.

use catalog::{
    AppEntry, AppInput, Catalog, CatalogError, Category, MAX_RATING, Price, ReviewChange,
    ReviewInput,
};

use super::{
    FormView, Row, display_datetime, empty_cell, yes_no,
    forms::{
        Choice, Field, FormData, InlineFormset, InlineRow, Input, inline_key, optional_int,
    },
    registry::{Inline, ModelAdmin},
};

fn cell(app: &AppEntry, column: &str) -> String {
    match column {
        "name" => app.name.clone(),
        "category" => app.category.label().to_string(),
        "date_added" => display_datetime(&app.date_added),
        "is_active" => yes_no(app.is_active),
        "price" => app.price.to_string(),
        _ => empty_cell(),
    }
}

pub async fn rows(catalog: &Catalog, admin: &ModelAdmin) -> Result<Vec<Row>, CatalogError> {
    Ok(catalog
        .list_apps()
        .await?
        .iter()
        .map(|app| Row {
            id: app.id,
            cells: admin.list_display.iter().map(|c| cell(app, c)).collect(),
        })
        .collect())
}

pub async fn initial(
    catalog: &Catalog,
    admin: &ModelAdmin,
    id: Option<i32>,
) -> Result<FormData, CatalogError> {
    let mut data = FormData::default();
    let mut existing = 0;
    match id {
        None => {
            data.push("is_active", "on");
            data.push("price", Price::ZERO.to_string());
        }
        Some(id) => {
            let app = catalog.app(id).await?;
            data.push("name", app.name);
            data.push("category", app.category.code());
            data.push("description", app.description);
            if app.is_active {
                data.push("is_active", "on");
            }
            data.push("price", app.price.to_string());

            for inline in admin.inlines {
                let reviews = catalog.reviews_for_app(id).await?;
                existing = reviews.len();
                for (index, review) in reviews.into_iter().enumerate() {
                    data.push(inline_key(inline, index, "id"), review.id.to_string());
                    data.push(inline_key(inline, index, "user"), review.user_id.to_string());
                    data.push(inline_key(inline, index, "review_text"), review.review_text);
                    data.push(inline_key(inline, index, "rating"), review.rating.to_string());
                }
            }
        }
    }
    for inline in admin.inlines {
        data.push(
            InlineFormset::total_key(inline),
            (existing + inline.extra).to_string(),
        );
    }
    Ok(data)
}

pub async fn form(
    catalog: &Catalog,
    admin: &ModelAdmin,
    id: Option<i32>,
    data: &FormData,
) -> Result<FormView, CatalogError> {
    let current_image = match id {
        Some(id) => catalog.app(id).await?.image,
        None => String::new(),
    };
    let mut image = Field::new("image", Input::Text, data).widget(admin.widget("image"));
    image.value = current_image;
    image.required = id.is_none();

    let mut is_active = Field::new("is_active", Input::Checkbox, data);
    is_active.value = if data.checked("is_active") { "on" } else { "" }.to_string();

    let categories = Category::ALL
        .iter()
        .map(|category| (category.code().to_string(), category.label().to_string()));

    let fields = vec![
        Field::new("name", Input::Text, data).required(),
        image,
        Field::new("category", Input::Select, data)
            .required()
            .choices(categories, data),
        Field::new("description", Input::Textarea, data),
        is_active,
        Field::new("price", Input::Number, data),
    ];

    let users: Vec<(String, String)> = catalog
        .list_users()
        .await?
        .into_iter()
        .map(|user| (user.id.to_string(), user.username))
        .collect();
    let inlines = admin
        .inlines
        .iter()
        .map(|inline| formset(inline, &users, data))
        .collect();

    Ok(FormView { fields, inlines })
}

fn formset(inline: &'static Inline, users: &[(String, String)], data: &FormData) -> InlineFormset {
    let total = InlineFormset::submitted_total(inline, data);
    let rows = (0..total)
        .map(|index| {
            let user = data.value(&inline_key(inline, index, "user"));
            InlineRow {
                index,
                id: data.value(&inline_key(inline, index, "id")).to_string(),
                users: users
                    .iter()
                    .map(|(value, label)| Choice {
                        value: value.clone(),
                        label: label.clone(),
                        selected: value == user,
                    })
                    .collect(),
                review_text: data.value(&inline_key(inline, index, "review_text")).to_string(),
                rating: data.value(&inline_key(inline, index, "rating")).to_string(),
                delete: data.checked(&inline_key(inline, index, "DELETE")),
            }
        })
        .collect();

    InlineFormset {
        prefix: inline.prefix,
        verbose_name_plural: inline.verbose_name_plural,
        rows,
        total,
    }
}

/// Turn the submitted inline rows into review changes.
///
/// Rows with an id are updated or, when ticked, deleted. Rows without an id
/// become new reviews unless they were left blank.
fn review_changes(inline: &Inline, data: &FormData) -> Result<Vec<ReviewChange>, CatalogError> {
    InlineFormset::validate_total(inline, data)?;
    let mut changes = Vec::new();
    for index in 0..InlineFormset::submitted_total(inline, data) {
        let key = |field: &str| inline_key(inline, index, field);

        let id = optional_int(data, &key("id"), "review")?;
        let delete = data.checked(&key("DELETE"));
        let user = optional_int(data, &key("user"), "review user")?;
        let review_text = data.value(&key("review_text")).to_string();
        let rating = optional_int(data, &key("rating"), "rating")?.unwrap_or(0);

        if id.is_none() && (delete || (user.is_none() && review_text.trim().is_empty())) {
            continue;
        }
        if let (Some(id), true) = (id, delete) {
            changes.push(ReviewChange::Delete(id));
            continue;
        }

        let user_id = user.ok_or_else(|| {
            CatalogError::Validation(format!("review {}: select a user", index + 1))
        })?;
        if !(0..=MAX_RATING).contains(&rating) {
            return Err(CatalogError::Validation(format!(
                "review {}: rating must be between 0 and {MAX_RATING}",
                index + 1
            )));
        }
        let input = ReviewInput {
            app_id: 0,
            user_id,
            review_text,
            rating,
        };
        changes.push(match id {
            Some(id) => ReviewChange::Update(id, input),
            None => ReviewChange::Add(input),
        });
    }
    Ok(changes)
}

pub async fn save(
    catalog: &Catalog,
    admin: &ModelAdmin,
    id: Option<i32>,
    data: &FormData,
) -> Result<i32, CatalogError> {
    let price: Price = data.value("price").parse()?;
    let mut changes = Vec::new();
    for inline in admin.inlines {
        changes.extend(review_changes(inline, data)?);
    }
    if id.is_none() && data.file("image").is_none() {
        return Err(CatalogError::Validation(
            "image: this field is required".to_string(),
        ));
    }

    let image = match data.file("image") {
        Some(upload) => Some(catalog.save_image(&upload.file_name, &upload.bytes).await?),
        None => None,
    };
    let input = AppInput {
        name: data.value("name").to_string(),
        category: data.value("category").to_string(),
        image: image.clone(),
        description: Some(data.value("description").to_string()),
        is_active: data.checked("is_active"),
        price,
    };

    match catalog.save_app(id, input, changes).await {
        Ok(app) => Ok(app.id),
        Err(err) => {
            if let Some(image) = image
                && let Err(discard) = catalog.discard_image(&image).await
            {
                tracing::warn!("failed to discard unsaved image {image}: {discard}");
            }
            Err(err)
        }
    }
}
