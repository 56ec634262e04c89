//! Diesel table definitions for the PostgreSQL schema.
//!
//! These definitions must match `backend/migrations` exactly.

diesel::table! {
    /// Operator-defined circular import areas.
    zones (id) {
        id -> Uuid,
        name -> Varchar,
        center_lat -> Float8,
        center_lng -> Float8,
        radius_km -> Float8,
        last_import_at -> Nullable<Timestamptz>,
        /// Denormalized count refreshed after each import.
        poi_count -> Int8,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::table! {
    /// Imported points of interest.
    ///
    /// `external_id` is unique when present; rows without one are never
    /// matched on re-import.
    pois (id) {
        id -> Uuid,
        zone_id -> Nullable<Uuid>,
        external_id -> Nullable<Text>,
        name -> Text,
        latitude -> Float8,
        longitude -> Float8,
        category -> Text,
        description -> Nullable<Text>,
        source_text -> Nullable<Text>,
        image_url -> Nullable<Text>,
        wikipedia_url -> Nullable<Text>,
        wikidata_id -> Nullable<Text>,
        tags -> Jsonb,
        /// Generated narration segments.
        audio_segments -> Nullable<Jsonb>,
        full_text -> Nullable<Text>,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

diesel::joinable!(pois -> zones (zone_id));
diesel::allow_tables_to_appear_in_same_query!(pois, zones);
