pub(crate) mod json_body;
