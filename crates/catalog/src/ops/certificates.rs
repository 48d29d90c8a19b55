use chrono::{DateTime, NaiveDate, Utc};
use sea_orm::{
    ActiveValue, DatabaseTransaction, QueryFilter, QueryOrder, TransactionTrait, prelude::*,
};

use crate::{CatalogError, Certificate, ResultCatalog, app_entries, certificates};

use super::{Catalog, required_text, with_tx};

/// Writable fields of a [`Certificate`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CertificateInput {
    pub app_id: i32,
    pub certificate_name: String,
    pub certificate_number: String,
    pub issued_by: String,
    /// Defaults to now on create; `None` keeps the stored date on update.
    pub issue_date: Option<DateTime<Utc>>,
    pub expiry_date: Option<NaiveDate>,
}

struct ValidCertificate {
    name: String,
    number: String,
    issued_by: String,
}

fn validate(input: &CertificateInput) -> ResultCatalog<ValidCertificate> {
    Ok(ValidCertificate {
        name: required_text(&input.certificate_name, "certificate name", 100)?,
        number: required_text(&input.certificate_number, "certificate number", 100)?,
        issued_by: required_text(&input.issued_by, "issued by", 100)?,
    })
}

/// Check the one-to-one and uniqueness rules before touching the table, so
/// callers get a readable message instead of a raw constraint name.
async fn ensure_unique(
    db_tx: &DatabaseTransaction,
    id: Option<i32>,
    app_id: i32,
    number: &str,
) -> ResultCatalog<()> {
    if app_entries::Entity::find_by_id(app_id)
        .one(db_tx)
        .await?
        .is_none()
    {
        return Err(CatalogError::ConstraintViolation(format!(
            "app {app_id} does not exist"
        )));
    }

    let mut same_number =
        certificates::Entity::find().filter(certificates::Column::CertificateNumber.eq(number));
    let mut same_app =
        certificates::Entity::find().filter(certificates::Column::AppId.eq(app_id));
    if let Some(id) = id {
        same_number = same_number.filter(certificates::Column::Id.ne(id));
        same_app = same_app.filter(certificates::Column::Id.ne(id));
    }

    if same_number.one(db_tx).await?.is_some() {
        return Err(CatalogError::ConstraintViolation(format!(
            "certificate number {number} already exists"
        )));
    }
    if same_app.one(db_tx).await?.is_some() {
        return Err(CatalogError::ConstraintViolation(format!(
            "app {app_id} already has a certificate"
        )));
    }
    Ok(())
}

async fn save_certificate_rows(
    db_tx: &DatabaseTransaction,
    id: Option<i32>,
    valid: ValidCertificate,
    input: CertificateInput,
) -> ResultCatalog<certificates::Model> {
    ensure_unique(db_tx, id, input.app_id, &valid.number).await?;

    let model = match id {
        None => {
            certificates::ActiveModel {
                id: ActiveValue::NotSet,
                app_id: ActiveValue::Set(input.app_id),
                certificate_name: ActiveValue::Set(valid.name),
                certificate_number: ActiveValue::Set(valid.number),
                issued_by: ActiveValue::Set(valid.issued_by),
                issue_date: ActiveValue::Set(input.issue_date.unwrap_or_else(Utc::now)),
                expiry_date: ActiveValue::Set(input.expiry_date),
            }
            .insert(db_tx)
            .await?
        }
        Some(id) => {
            let mut active: certificates::ActiveModel = certificates::Entity::find_by_id(id)
                .one(db_tx)
                .await?
                .ok_or_else(|| CatalogError::NotFound(format!("certificate {id}")))?
                .into();
            active.app_id = ActiveValue::Set(input.app_id);
            active.certificate_name = ActiveValue::Set(valid.name);
            active.certificate_number = ActiveValue::Set(valid.number);
            active.issued_by = ActiveValue::Set(valid.issued_by);
            if let Some(issue_date) = input.issue_date {
                active.issue_date = ActiveValue::Set(issue_date);
            }
            active.expiry_date = ActiveValue::Set(input.expiry_date);
            active.update(db_tx).await?
        }
    };
    Ok(model)
}

impl Catalog {
    /// Every certificate with the name of the app it belongs to.
    pub async fn list_certificates(&self) -> ResultCatalog<Vec<(Certificate, String)>> {
        let rows = certificates::Entity::find()
            .find_also_related(app_entries::Entity)
            .order_by_asc(certificates::Column::Id)
            .all(&self.database)
            .await?;
        Ok(rows
            .into_iter()
            .map(|(certificate, app)| {
                let app_name = app.map(|a| a.name).unwrap_or_default();
                (Certificate::from(certificate), app_name)
            })
            .collect())
    }

    pub async fn certificate(&self, id: i32) -> ResultCatalog<Certificate> {
        certificates::Entity::find_by_id(id)
            .one(&self.database)
            .await?
            .map(Certificate::from)
            .ok_or_else(|| CatalogError::NotFound(format!("certificate {id}")))
    }

    pub async fn certificate_for_app(&self, app_id: i32) -> ResultCatalog<Option<Certificate>> {
        Ok(certificates::Entity::find()
            .filter(certificates::Column::AppId.eq(app_id))
            .one(&self.database)
            .await?
            .map(Certificate::from))
    }

    pub async fn create_certificate(&self, input: CertificateInput) -> ResultCatalog<Certificate> {
        let valid = validate(&input)?;
        let model = with_tx!(self, |db_tx| {
            save_certificate_rows(&db_tx, None, valid, input).await
        })?;
        Ok(Certificate::from(model))
    }

    pub async fn update_certificate(
        &self,
        id: i32,
        input: CertificateInput,
    ) -> ResultCatalog<Certificate> {
        let valid = validate(&input)?;
        let model = with_tx!(self, |db_tx| {
            save_certificate_rows(&db_tx, Some(id), valid, input).await
        })?;
        Ok(Certificate::from(model))
    }

    pub async fn delete_certificate(&self, id: i32) -> ResultCatalog<()> {
        let res = certificates::Entity::delete_by_id(id)
            .exec(&self.database)
            .await?;
        if res.rows_affected == 0 {
            return Err(CatalogError::NotFound(format!("certificate {id}")));
        }
        Ok(())
    }
}
