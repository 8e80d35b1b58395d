// WHY: Built-in HVAC abbreviation table used to seed a fresh dictionary file.
// Later entries win on key collision, so the table reads like insertion history.

/// (original, abbreviated) pairs in insertion order
pub const DEFAULT_TERMS: &[(&str, &str)] = &[
    ("Accessory", "Accy"),
    ("Actuator", "Act"),
    ("Adapter", "Adapt"),
    ("Aluminum", "Alum"),
    ("Aluminium", "Alum"),
    ("Analog", "Anlg"),
    ("Averaging", "Avg"),
    ("BACnet", "Bnet"),
    ("Black", "Blk"),
    ("Blower", "Blwr"),
    ("Breaker", "Brkr"),
    ("Bronze", "Brz"),
    ("Butterfly", "Bfly"),
    ("Cable", "Cbl"),
    ("Capacitor", "Cap"),
    ("Capillary", "Cap"),
    ("Check", "Chk"),
    ("Compressor", "Comp"),
    ("Controller", "Ctrlr"),
    ("Control", "Ctrl"),
    ("Copper", "Cu"),
    ("Cover", "Cvr"),
    ("Detector", "Detect"),
    ("Differential", "Diff"),
    ("Electric", "Elec"),
    ("Enclosure", "Encl"),
    ("Evaporator", "Evap"),
    ("Expansion", "Exp"),
    ("Flange", "Flg"),
    ("Flare", "Flr"),
    ("Floating", "Flt"),
    ("Gasket", "Gskt"),
    ("Hazardous", "Hzrd"),
    ("Heater", "Htr"),
    ("Heat", "Ht"),
    ("High", "Hi"),
    ("Level", "Lvl"),
    ("Modulating", "Mod"),
    ("Modular", "Mod"),
    ("Motor", "Mtr"),
    ("Mounted", "Mtd"),
    ("Mount", "Mt"),
    ("Mounting", "Mtg"),
    ("Pack", "Pk"),
    ("Package", "Pkg"),
    ("Panel", "Pnl"),
    ("Plate", "Plt"),
    ("Pressure", "Press"),
    ("Probe", "Prb"),
    ("Programmable", "Prog"),
    ("Programming", "Prog"),
    ("Program", "Prog"),
    ("Regulator", "Reg"),
    ("Relay", "Rly"),
    ("Relief", "Rlf"),
    ("Remote", "Rmt"),
    ("Sensor", "Sens"),
    ("Setpoint", "SetPt"),
    ("Set Point", "SetPt"),
    ("Stainless Steel", "SS"),
    ("Sweat", "Swt"),
    ("Switch", "Sw"),
    ("Temperature", "Temp"),
    ("Thermistor", "Thrmst"),
    ("Thermostat", "Tstat"),
    ("Transceiver", "Trnsvr"),
    ("Transmitter", "Trnsmt"),
    ("Valve", "Vlv"),
    ("Water", "Wtr"),
    ("White", "Wht"),
    ("Without", "w/o"),
    ("With", "w/"),
    ("Explosion", "Expl"),
    ("Proof", "Prf"),
    ("Protection", "Prot"),
    ("Double", "Dbl"),
    ("Minutes", "Min"),
    ("Minute", "Min"),
    ("Inches", "\""),
    ("Inch", "\""),
    ("Piece", "Pc"),
    ("Voltage", "Volt"),
    ("Amps", "Amp"),
    ("Board", "Brd"),
    ("Extension", "Ext"),
    ("Transformer", "Xfrmr"),
    ("Standard", "Std"),
    ("Round", "Rnd"),
    ("Density", "Dens"),
    ("Reflector", "Rflctr"),
    ("Disconnect", "Discon"),
    ("Regulating", "Reg"),
    ("Replacement", "Repl"),
    ("Infrared", "IR"),
    ("Filter", "Filt"),
    ("Included", "Incl"),
    ("Includes", "Incl"),
    ("Position", "Pos"),
    ("Manual Reset", "MR"),
    ("Damper", "Dmpr"),
    ("Label", "Lbl"),
    ("Assemblies", "ASSY"),
    ("Assembly", "ASSY"),
    ("Assembled", "ASSD"),
    ("Cabinet", "CAB"),
    ("Cabinets", "CABS"),
    ("Factory", "FACT"),
    ("Showers", "SHWR"),
    ("Shower", "SHWR"),
    ("Recirculation", "RECIRC"),
    ("Piping", "PIPE"),
    ("Stainless", "STSTL"),
    ("Chrome", "CHR"),
    ("Plated", "PLT"),
    ("Thermostatic", "THERM"),
    ("Mixing", "MIX"),
    ("Exposed", "EXP"),
    ("Single", "SNGL"),
    ("Series", "SER"),
    ("Hydrotherapy", "HYDRO"),
    ("Connection", "CONN"),
    ("Capacity", "CAP"),
    ("Group", "GRP"),
    ("Liquid Line", "Liq Ln"),
    ("Suction Line", "Suc Ln"),
    ("High Efficiency", "Hi Eff"),
    ("Factory Assembled", "Fact Assy"),
    ("Air Handling Unit", "AHU"),
    ("Variable Frequency Drive", "VFD"),
    ("Building Management System", "BMS"),
];
