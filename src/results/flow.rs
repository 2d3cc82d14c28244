use enumset::EnumSetType;

/// Technology section of the optimizer output.
#[derive(Debug, EnumSetType, Hash)]
pub enum Section {
    ElectricLoad,
    ElectricUtility,
    Pv,
    ElectricStorage,
    Generator,
    Chp,
}

impl Section {
    /// Section names across the API versions, current first.
    #[must_use]
    pub const fn aliases(self) -> &'static [&'static str] {
        match self {
            Self::ElectricLoad => &["ElectricLoad", "LoadProfile"],
            Self::ElectricUtility => &["ElectricUtility", "ElectricTariff"],
            Self::Pv => &["PV"],
            Self::ElectricStorage => &["ElectricStorage", "Storage"],
            Self::Generator => &["Generator", "Diesel"],
            Self::Chp => &["CHP"],
        }
    }
}

/// One physical power flow, in kilowatts.
#[derive(Debug, EnumSetType, Hash)]
pub enum Flow {
    Load,
    UtilityToLoad,
    UtilityToBess,
    SolarToLoad,
    SolarToBess,
    SolarExport,
    BessToLoad,
    BessExport,
    GensetToLoad,
    GensetToBess,
    GenExport,
    ChpToLoad,
}

impl Flow {
    #[must_use]
    pub const fn section(self) -> Section {
        match self {
            Self::Load => Section::ElectricLoad,
            Self::UtilityToLoad | Self::UtilityToBess => Section::ElectricUtility,
            Self::SolarToLoad | Self::SolarToBess | Self::SolarExport => Section::Pv,
            Self::BessToLoad | Self::BessExport => Section::ElectricStorage,
            Self::GensetToLoad | Self::GensetToBess | Self::GenExport => Section::Generator,
            Self::ChpToLoad => Section::Chp,
        }
    }

    /// Series keys within the section, current names first and `year_one_*` names after.
    #[must_use]
    pub const fn keys(self) -> &'static [&'static str] {
        match self {
            Self::Load => &["load_series_kw", "year_one_electric_load_series_kw"],
            Self::UtilityToLoad => &[
                "electric_to_load_series_kw",
                "year_one_to_load_series_kw",
                "year_one_grid_to_load_series_kw",
            ],
            Self::UtilityToBess => &[
                "electric_to_storage_series_kw",
                "year_one_to_battery_series_kw",
                "year_one_grid_to_battery_series_kw",
            ],
            Self::SolarToLoad | Self::GensetToLoad | Self::ChpToLoad => {
                &["electric_to_load_series_kw", "year_one_to_load_series_kw"]
            }
            Self::SolarToBess | Self::GensetToBess => {
                &["electric_to_storage_series_kw", "year_one_to_battery_series_kw"]
            }
            Self::SolarExport | Self::GenExport => {
                &["electric_to_grid_series_kw", "year_one_to_grid_series_kw"]
            }
            Self::BessToLoad => &[
                "storage_to_load_series_kw",
                "electric_to_load_series_kw",
                "year_one_to_load_series_kw",
            ],
            Self::BessExport => &[
                "storage_to_grid_series_kw",
                "electric_to_grid_series_kw",
                "year_one_to_grid_series_kw",
            ],
        }
    }
}
