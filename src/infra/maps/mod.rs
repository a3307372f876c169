pub mod geoapify_maps;
