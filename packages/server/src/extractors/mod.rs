pub mod country_form;
