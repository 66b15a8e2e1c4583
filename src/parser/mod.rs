pub mod fields;

pub use fields::{
    clean_number, extract_age, extract_epic_no, extract_gender, extract_house_number,
    extract_name, extract_relative,
};
