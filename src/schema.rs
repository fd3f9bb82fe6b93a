table! {
    notes (id) {
        id -> Int4,
        title -> Varchar,
        content -> Varchar,
        author -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    note_versions (id) {
        id -> Int4,
        note_id -> Int4,
        version_number -> Int4,
        title -> Varchar,
        content -> Varchar,
        author -> Text,
        note_created_at -> Timestamptz,
        note_updated_at -> Timestamptz,
        created_at -> Timestamptz,
    }
}

table! {
    folders (id) {
        id -> Int4,
        name -> Text,
        created_at -> Timestamptz,
        updated_at -> Timestamptz,
    }
}

table! {
    folder_notes (folder_id, note_id) {
        folder_id -> Int4,
        note_id -> Int4,
    }
}

table! {
    tags (id) {
        id -> Int4,
        name -> Text,
        created_at -> Timestamptz,
    }
}

table! {
    note_tags (note_id, tag_id) {
        note_id -> Int4,
        tag_id -> Int4,
    }
}

joinable!(note_versions -> notes (note_id));
joinable!(folder_notes -> folders (folder_id));
joinable!(folder_notes -> notes (note_id));
joinable!(note_tags -> notes (note_id));
joinable!(note_tags -> tags (tag_id));

allow_tables_to_appear_in_same_query!(folder_notes, folders, note_tags, note_versions, notes, tags,);
