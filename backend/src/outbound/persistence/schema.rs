//! Diesel table definitions.
//!
//! Must match `backend/migrations`; regenerate with `diesel print-schema`
//! after changing a migration.

diesel::table! {
    /// One row per employee. Column names follow the JSON field names.
    employees (id) {
        id -> Uuid,
        nombre -> Varchar,
        puesto -> Varchar,
        salario -> Float8,
        fecha_contratacion -> Date,
        departamento -> Nullable<Varchar>,
        email -> Nullable<Varchar>,
    }
}
