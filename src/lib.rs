pub mod big5;
pub mod binary;
pub mod bitmap;
pub mod checksum;
pub mod context;
pub mod dump;
pub mod emoji;
pub mod error;
pub mod filter;
pub mod font;
pub mod font_data;
pub mod font_data_impl;
pub mod font_specimen;
pub mod font_tables;
pub mod fontfile;
pub mod gdef;
pub mod get_name;
pub mod glyph_info;
pub mod glyph_position;
pub mod glyph_width;
pub mod gpos;
pub mod gsub;
pub mod layout;
pub mod macroman;
pub mod morx;
pub mod opentype;
pub mod outline;
pub mod post;
pub mod scripts;
pub mod size;
pub mod subset;
pub mod tables;
pub mod tag;
pub mod unicode;
pub mod variations;
pub mod woff;
pub mod woff2;

#[cfg(test)]
mod tests;
