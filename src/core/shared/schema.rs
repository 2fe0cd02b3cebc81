diesel::table! {
    analysts (id) {
        id -> Varchar,
        name -> Varchar,
        email -> Varchar,
        team -> Varchar,
    }
}

diesel::table! {
    supports (id) {
        id -> Varchar,
        name -> Varchar,
        analyst_id -> Varchar,
    }
}

diesel::table! {
    reasons (id) {
        id -> Varchar,
        description -> Varchar,
    }
}

diesel::table! {
    tickets (id) {
        id -> Varchar,
        support_id -> Varchar,
        reason_id -> Varchar,
        analyst_id -> Varchar,
        observation -> Text,
        date -> Date,
    }
}

diesel::allow_tables_to_appear_in_same_query!(analysts, supports, reasons, tickets);
