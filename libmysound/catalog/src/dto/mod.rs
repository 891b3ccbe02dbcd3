pub(crate) mod playlist;
pub(crate) mod track_record;
