pub mod scraping;
