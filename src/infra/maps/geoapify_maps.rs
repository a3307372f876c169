use crate::domain::ports::MapSnapshotService;

/// Builds Geoapify static-map URLs: a marker on the reported fix plus a
/// circle for the reported accuracy. The URL is the reference; nothing is
/// fetched here.
pub struct GeoapifyMaps {
    api_key: Option<String>,
}

impl GeoapifyMaps {
    pub fn new(api_key: Option<String>) -> Self {
        Self { api_key }
    }
}

impl MapSnapshotService for GeoapifyMaps {
    fn snapshot_url(&self, lat: f64, lng: f64, accuracy_m: f64) -> Option<String> {
        let api_key = self.api_key.as_ref()?;

        Some(format!(
            "https://maps.geoapify.com/v1/staticmap?style=osm-bright&width=1600&height=800&scale=2&zoom=17\
             &center=lonlat:{lng},{lat}\
             &marker=lonlat:{lng},{lat};color:%23ff0000;size:large\
             &circle=lonlat:{lng},{lat};radius:{accuracy_m};fillcolor:%23008cff33;strokeColor:%23008cff;strokeWidth:3\
             &apiKey={api_key}"
        ))
    }
}
