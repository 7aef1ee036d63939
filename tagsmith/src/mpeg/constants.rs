// Bitrates (kbps), indexed by [version][layer][bitrate index]
//
// The first index is 0 for version 1 and 1 for versions 2 and 2.5. Index 0 and
// 15 of each row are the "free" and reserved values, both unusable.
pub(crate) const BITRATES: [[[u32; 16]; 3]; 2] = [
	[
		[
			0, 32, 64, 96, 128, 160, 192, 224, 256, 288, 320, 352, 384, 416, 448, 0,
		],
		[
			0, 32, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 384, 0,
		],
		[
			0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0,
		],
	],
	[
		[
			0, 32, 48, 56, 64, 80, 96, 112, 128, 144, 160, 176, 192, 224, 256, 0,
		],
		[0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0],
		[0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0],
	],
];

// Sample rates (Hz), indexed by [MpegVersion as usize][sample rate index]
//
// Index 3 is reserved for every version.
pub(crate) const SAMPLE_RATES: [[u32; 3]; 3] = [
	[44100, 48000, 32000],
	[22050, 24000, 16000],
	[11025, 12000, 8000],
];

// Samples per frame, indexed by [layer index][version index]
pub(crate) const SAMPLES: [[u16; 2]; 3] = [[384, 384], [1152, 1152], [1152, 576]];

// Side information size in bytes, indexed by [version index][channel mode]
pub(crate) const SIDE_INFORMATION_SIZES: [[u32; 4]; 2] = [[32, 32, 32, 17], [17, 17, 17, 9]];

// Padding slot size in bytes, indexed by [layer index]
pub(crate) const PADDING_SIZES: [u8; 3] = [4, 1, 1];
