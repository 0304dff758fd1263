//! User and emergency contact operations.

use sqlx::{Executor, Sqlite, SqliteConnection};
use trip_core::{EmergencyContact, EmergencyContactInput, Gender, User};

use crate::error::{DatabaseError, Result};
use crate::models::{EmergencyContactRow, UserRow};

/// Look up a user by chat id.
pub async fn find_user_by_chat_id<'e, E>(executor: E, telegram_chat_id: i64) -> Result<Option<User>>
where
    E: Executor<'e, Database = Sqlite>,
{
    sqlx::query_as::<_, UserRow>(
        r#"
        SELECT id, telegram_chat_id, name, phone, gender
        FROM users
        WHERE telegram_chat_id = ?
        "#,
    )
    .bind(telegram_chat_id)
    .fetch_optional(executor)
    .await?
    .map(User::try_from)
    .transpose()
}

/// Get a user by chat id, failing with `NotFound` when absent.
pub async fn get_user_by_chat_id<'e, E>(executor: E, telegram_chat_id: i64) -> Result<User>
where
    E: Executor<'e, Database = Sqlite>,
{
    find_user_by_chat_id(executor, telegram_chat_id)
        .await?
        .ok_or_else(|| DatabaseError::not_found("User", telegram_chat_id))
}

/// Create the user for a chat id, or refresh their profile if one exists.
pub async fn upsert_user<'e, E>(
    executor: E,
    telegram_chat_id: i64,
    name: &str,
    phone: &str,
    gender: Gender,
) -> Result<User>
where
    E: Executor<'e, Database = Sqlite>,
{
    let row = sqlx::query_as::<_, UserRow>(
        r#"
        INSERT INTO users (telegram_chat_id, name, phone, gender)
        VALUES (?, ?, ?, ?)
        ON CONFLICT(telegram_chat_id) DO UPDATE SET
            name = excluded.name,
            phone = excluded.phone,
            gender = excluded.gender,
            updated_at = strftime('%Y-%m-%dT%H:%M:%fZ', 'now')
        RETURNING id, telegram_chat_id, name, phone, gender
        "#,
    )
    .bind(telegram_chat_id)
    .bind(name)
    .bind(phone)
    .bind(gender.as_str())
    .fetch_one(executor)
    .await?;

    User::try_from(row)
}

/// Replace a user's emergency contacts with the given list.
pub async fn replace_contacts(
    conn: &mut SqliteConnection,
    user_id: i64,
    contacts: &[EmergencyContactInput],
) -> Result<Vec<EmergencyContact>> {
    sqlx::query("DELETE FROM emergency_contacts WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;

    let mut stored = Vec::with_capacity(contacts.len());
    for contact in contacts {
        let row = sqlx::query_as::<_, EmergencyContactRow>(
            r#"
            INSERT INTO emergency_contacts (user_id, name, phone, telegram_chat_id)
            VALUES (?, ?, ?, ?)
            RETURNING id, user_id, name, phone, telegram_chat_id
            "#,
        )
        .bind(user_id)
        .bind(contact.name.trim())
        .bind(contact.phone.trim())
        .bind(contact.telegram_chat_id)
        .fetch_one(&mut *conn)
        .await?;
        stored.push(row.into());
    }

    Ok(stored)
}

/// List a user's emergency contacts in insertion order.
pub async fn list_contacts<'e, E>(executor: E, user_id: i64) -> Result<Vec<EmergencyContact>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, EmergencyContactRow>(
        r#"
        SELECT id, user_id, name, phone, telegram_chat_id
        FROM emergency_contacts
        WHERE user_id = ?
        ORDER BY id ASC
        "#,
    )
    .bind(user_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(EmergencyContact::from).collect())
}

/// List the emergency contacts of the user owning a chat id.
///
/// Returns an empty list if no such user exists.
pub async fn list_contacts_by_chat_id<'e, E>(
    executor: E,
    telegram_chat_id: i64,
) -> Result<Vec<EmergencyContact>>
where
    E: Executor<'e, Database = Sqlite>,
{
    let rows = sqlx::query_as::<_, EmergencyContactRow>(
        r#"
        SELECT c.id, c.user_id, c.name, c.phone, c.telegram_chat_id
        FROM emergency_contacts c
        JOIN users u ON u.id = c.user_id
        WHERE u.telegram_chat_id = ?
        ORDER BY c.id ASC
        "#,
    )
    .bind(telegram_chat_id)
    .fetch_all(executor)
    .await?;

    Ok(rows.into_iter().map(EmergencyContact::from).collect())
}

/// Delete a user. Contacts are removed by cascade.
pub async fn delete_user<'e, E>(executor: E, telegram_chat_id: i64) -> Result<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    let result = sqlx::query("DELETE FROM users WHERE telegram_chat_id = ?")
        .bind(telegram_chat_id)
        .execute(executor)
        .await?;

    if result.rows_affected() == 0 {
        return Err(DatabaseError::not_found("User", telegram_chat_id));
    }

    Ok(())
}
